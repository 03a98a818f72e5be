//! Custom Axum extractors for request authentication.
//!
//! Provides:
//! - `SignedBody<T>` — verifies the `Paydesk-Signature` header against a
//!   signed JSON body using the submitting admin's device secret
//!   (used by the Service API).
//! - `SellerAuth` — resolves the `Authorization: Bearer` token to an active
//!   seller (used by the Seller API and the push WebSocket).
//! - `AdminAuth` — checks the `Paydesk-Admin-Authorization` header against
//!   the hashed ops secret (used by the Admin API).
//!
//! All cryptographic operations are delegated to [`paydesk_sdk::signature`]
//! and [`paydesk_sdk::token`].

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use kanau::processor::Processor;
use paydesk_core::entities::admin::GetAdminById;
use paydesk_core::entities::seller::GetSellerById;
use paydesk_core::framework::DatabaseProcessor;
use paydesk_sdk::objects::submit::SubmitNotification;
use paydesk_sdk::signature::{
    ADMIN_AUTH_HEADER, SIGNATURE_HEADER, Signature, SignatureError, SignedObject,
};
use paydesk_sdk::token::{TokenError, strip_bearer, verify_seller_token};
use uuid::Uuid;

use crate::api::error_response;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// SignedBody — Service API authentication via signed JSON body
// ---------------------------------------------------------------------------

/// Types that name the admin whose device secret verifies them.
///
/// The ingest body carries its own `admin_id`; the extractor looks that
/// admin up and verifies the signature with their stored device secret.
pub trait AdminScoped {
    fn admin_id(&self) -> Uuid;
}

impl AdminScoped for SubmitNotification {
    fn admin_id(&self) -> Uuid {
        self.admin_id
    }
}

/// An Axum extractor that verifies the `Paydesk-Signature` header and
/// deserializes + authenticates the JSON request body.
///
/// # Header format
///
/// ```text
/// Paydesk-Signature: {unix_timestamp}.{base64_signature}
/// ```
///
/// The signature is computed as
/// `HMAC-SHA256("{timestamp}.{json_body}", device_secret)`.
pub struct SignedBody<T: Signature>(pub T);

/// Errors that can occur during signed-body verification.
#[derive(Debug, thiserror::Error)]
pub enum SignedBodyError {
    #[error("missing Paydesk-Signature header")]
    MissingHeader,
    #[error("invalid Paydesk-Signature header format")]
    InvalidHeader,
    #[error("invalid signature encoding")]
    InvalidBase64,
    #[error("failed to read request body")]
    BodyReadError,
    #[error("invalid JSON body: {0}")]
    JsonError(serde_json::Error),
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<SignatureError> for SignedBodyError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::InvalidFormat => Self::InvalidHeader,
            SignatureError::InvalidBase64 => Self::InvalidBase64,
            SignatureError::Json(e) => Self::JsonError(e),
            SignatureError::SignatureMismatch | SignatureError::Expired => Self::VerificationFailed,
        }
    }
}

impl IntoResponse for SignedBodyError {
    fn into_response(self) -> Response {
        match self {
            SignedBodyError::MissingHeader => error_response(
                StatusCode::UNAUTHORIZED,
                "missing_signature",
                "missing Paydesk-Signature header",
            ),
            SignedBodyError::InvalidHeader => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_signature_header",
                "invalid Paydesk-Signature header format",
            ),
            SignedBodyError::InvalidBase64 => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_signature_header",
                "invalid signature encoding",
            ),
            SignedBodyError::BodyReadError => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                "failed to read request body",
            ),
            SignedBodyError::JsonError(e) => error_response(
                StatusCode::BAD_REQUEST,
                "invalid_body",
                format!("invalid JSON body: {e}"),
            ),
            SignedBodyError::VerificationFailed => error_response(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "signature verification failed",
            ),
            SignedBodyError::Database(e) => {
                tracing::error!(error = %e, "signed body verification database error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

impl<T: Signature + AdminScoped + Send> FromRequest<AppState> for SignedBody<T> {
    type Rejection = SignedBodyError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let header_value = req
            .headers()
            .get(SIGNATURE_HEADER)
            .ok_or(SignedBodyError::MissingHeader)?
            .to_str()
            .map_err(|_| SignedBodyError::InvalidHeader)?
            .to_owned();

        let body_bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
            .await
            .map_err(|_| SignedBodyError::BodyReadError)?;

        let json =
            String::from_utf8(body_bytes.to_vec()).map_err(|_| SignedBodyError::BodyReadError)?;

        let signed = SignedObject::<T>::from_header_and_body(&header_value, json)?;

        // The body names the admin; their stored device secret is the key.
        // An unknown or deactivated admin fails exactly like a bad
        // signature so the endpoint does not confirm which ids exist.
        let processor = DatabaseProcessor {
            pool: state.db.clone(),
        };
        let admin = processor
            .process(GetAdminById {
                admin_id: signed.body.admin_id(),
            })
            .await
            .map_err(SignedBodyError::Database)?;
        let Some(admin) = admin.filter(|a| a.active) else {
            return Err(SignedBodyError::VerificationFailed);
        };

        let verified_body = signed.verify(admin.device_secret.as_bytes())?;

        Ok(SignedBody(verified_body))
    }
}

// ---------------------------------------------------------------------------
// SellerAuth — Seller API authentication via bearer token
// ---------------------------------------------------------------------------

/// An Axum extractor that resolves the `Authorization: Bearer` token to an
/// active seller.
///
/// The token signature is checked against the server's token key; the
/// seller row must exist and be active.
#[derive(Debug, Clone, Copy)]
pub struct SellerAuth {
    pub seller_id: Uuid,
}

/// Errors returned by the [`SellerAuth`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum SellerAuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("invalid bearer token")]
    InvalidToken,
    #[error("seller is not active")]
    UnknownSeller,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<TokenError> for SellerAuthError {
    fn from(_: TokenError) -> Self {
        Self::InvalidToken
    }
}

impl IntoResponse for SellerAuthError {
    fn into_response(self) -> Response {
        match self {
            SellerAuthError::MissingHeader => error_response(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing Authorization header",
            ),
            SellerAuthError::InvalidToken => {
                error_response(StatusCode::UNAUTHORIZED, "unauthorized", "invalid token")
            }
            SellerAuthError::UnknownSeller => error_response(
                StatusCode::FORBIDDEN,
                "seller_disabled",
                "seller is not active",
            ),
            SellerAuthError::Database(e) => {
                tracing::error!(error = %e, "seller auth database error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}

impl FromRequestParts<AppState> for SellerAuth {
    type Rejection = SellerAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or(SellerAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| SellerAuthError::InvalidToken)?;

        let token = strip_bearer(header_value).ok_or(SellerAuthError::InvalidToken)?;

        let identity = {
            let auth = state.config.auth().await;
            verify_seller_token(token, auth.key_bytes())?
        };

        let processor = DatabaseProcessor {
            pool: state.db.clone(),
        };
        let seller = processor
            .process(GetSellerById {
                seller_id: identity.seller_id,
            })
            .await
            .map_err(SellerAuthError::Database)?;
        if !seller.is_some_and(|s| s.active) {
            return Err(SellerAuthError::UnknownSeller);
        }

        Ok(SellerAuth {
            seller_id: identity.seller_id,
        })
    }
}

// ---------------------------------------------------------------------------
// AdminAuth — Admin API authentication via plaintext secret header
// ---------------------------------------------------------------------------

/// An Axum extractor that checks the `Paydesk-Admin-Authorization` header
/// against the argon2-hashed ops secret from the configuration.
pub struct AdminAuth;

/// Errors returned by the [`AdminAuth`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AdminAuthError {
    #[error("missing Paydesk-Admin-Authorization header")]
    MissingHeader,
    #[error("admin secret verification failed")]
    VerificationFailed,
}

impl IntoResponse for AdminAuthError {
    fn into_response(self) -> Response {
        match self {
            AdminAuthError::MissingHeader => error_response(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "missing Paydesk-Admin-Authorization header",
            ),
            AdminAuthError::VerificationFailed => error_response(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "admin secret verification failed",
            ),
        }
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AdminAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let secret = parts
            .headers
            .get(ADMIN_AUTH_HEADER)
            .ok_or(AdminAuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AdminAuthError::VerificationFailed)?;

        let admin = state.config.admin().await;
        if !admin.verify_secret(secret) {
            return Err(AdminAuthError::VerificationFailed);
        }

        Ok(AdminAuth)
    }
}
