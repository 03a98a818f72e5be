//! Decryption sidecar configuration.

use std::time::Duration;
use url::Url;

/// Default per-request timeout for the sidecar.
pub const DEFAULT_DECRYPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where encrypted alert payloads are sent for decryption.
#[derive(Debug, Clone)]
pub struct DecryptConfig {
    /// Full URL of the sidecar's decrypt endpoint.
    pub endpoint: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl DecryptConfig {
    /// Create a new DecryptConfig with the default timeout.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            timeout: DEFAULT_DECRYPT_TIMEOUT,
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
