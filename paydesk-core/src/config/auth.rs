//! Seller token authentication configuration.

/// Signing key for seller bearer tokens.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key bytes for the token HMAC.
    pub token_key: Box<[u8]>,
}

impl AuthConfig {
    /// Create a new AuthConfig.
    pub fn new(token_key: impl Into<Box<[u8]>>) -> Self {
        Self {
            token_key: token_key.into(),
        }
    }

    /// Get the key bytes for token signing and verification.
    pub fn key_bytes(&self) -> &[u8] {
        &self.token_key
    }
}
