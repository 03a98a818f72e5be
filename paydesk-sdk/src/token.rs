//! Seller bearer tokens.
//!
//! Sellers authenticate REST calls and the push WebSocket with an opaque
//! bearer token issued out of band (at onboarding or from the admin
//! dashboard):
//!
//! ```text
//! Authorization: Bearer {seller_id}.{issued_at}.{nonce}.{base64_signature}
//! ```
//!
//! The signature is `HMAC-SHA256("{seller_id}.{issued_at}.{nonce}", key)`
//! keyed with the server's token key.  Tokens carry no expiry; revocation
//! happens by rotating the key or deactivating the seller row.

use uuid::Uuid;

/// The authenticated identity a verified token resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SellerIdentity {
    pub seller_id: Uuid,
    /// Unix timestamp of token issuance.
    pub issued_at: i64,
}

/// Errors produced by token parsing and verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid token signature")]
    SignatureMismatch,
}

impl From<ring::error::Unspecified> for TokenError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// Issue a bearer token for the given seller.
///
/// The nonce makes every issued token distinct so individual tokens can be
/// told apart in request logs.
pub fn issue_seller_token(seller_id: Uuid, key: &[u8]) -> String {
    let issued_at = time::OffsetDateTime::now_utc().unix_timestamp();
    let nonce: [u8; 8] = rand::random();
    let nonce = fast32::base64::RFC4648_NOPAD.encode(&nonce);
    let data = format!("{seller_id}.{issued_at}.{nonce}");
    let sig = ring::hmac::sign(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
    );
    format!(
        "{data}.{}",
        fast32::base64::RFC4648_NOPAD.encode(sig.as_ref())
    )
}

/// Verify a bearer token and return the seller identity it was issued to.
pub fn verify_seller_token(token: &str, key: &[u8]) -> Result<SellerIdentity, TokenError> {
    let mut parts = token.split('.');
    let (Some(seller_id), Some(issued_at), Some(nonce), Some(sig), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(TokenError::InvalidFormat);
    };

    let seller_id: Uuid = seller_id.parse().map_err(|_| TokenError::InvalidFormat)?;
    let issued_at: i64 = issued_at.parse().map_err(|_| TokenError::InvalidFormat)?;
    let sig_bytes = fast32::base64::RFC4648_NOPAD
        .decode_str(sig)
        .map_err(|_| TokenError::InvalidBase64)?;

    let data = format!("{seller_id}.{issued_at}.{nonce}");
    ring::hmac::verify(
        &ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key),
        data.as_bytes(),
        &sig_bytes,
    )?;

    Ok(SellerIdentity {
        seller_id,
        issued_at,
    })
}

/// Extract the token from an `Authorization: Bearer …` header value.
pub fn strip_bearer(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ").map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify_round_trip() {
        let key = b"token-key";
        let seller_id = Uuid::new_v4();
        let token = issue_seller_token(seller_id, key);

        let identity = verify_seller_token(&token, key).unwrap();
        assert_eq!(identity.seller_id, seller_id);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let seller_id = Uuid::new_v4();
        let token = issue_seller_token(seller_id, b"right-key");
        assert!(matches!(
            verify_seller_token(&token, b"wrong-key"),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn truncated_token_is_rejected() {
        let seller_id = Uuid::new_v4();
        let token = issue_seller_token(seller_id, b"key");
        let truncated = token.rsplit_once('.').map(|(head, _)| head).unwrap();
        assert!(matches!(
            verify_seller_token(truncated, b"key"),
            Err(TokenError::InvalidFormat)
        ));
    }

    #[test]
    fn forged_seller_id_is_rejected() {
        let key = b"token-key";
        let token = issue_seller_token(Uuid::new_v4(), key);
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", Uuid::new_v4());
        assert!(matches!(
            verify_seller_token(&forged, key),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn bearer_prefix_is_stripped() {
        assert_eq!(strip_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(strip_bearer("Basic abc"), None);
    }
}
