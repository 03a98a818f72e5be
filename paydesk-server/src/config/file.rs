//! TOML file configuration structures.
//!
//! These structs directly map to the `paydesk-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub push: PushConfig,
    pub decrypt: DecryptConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Admin configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// The ops secret. If this is plaintext (doesn't start with `$argon2`),
    /// it will be hashed and the config file will be rewritten.
    pub secret: String,
}

/// Seller token authentication section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Signing key for seller bearer tokens.
    pub token_key: String,
}

/// Push delivery tuning. The whole section may be omitted.
///
/// These values are bound when the registry, queue, and sweeper are built
/// at startup; changing them requires a restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// How long the outbound queue buffers a seller's notifications
    /// before flushing them as one frame. Zero flushes immediately.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// How often the sweeper scans for dead connections.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// How long a connection may stay silent before it is dropped.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_debounce_ms() -> u64 {
    0
}

fn default_sweep_interval_secs() -> u64 {
    10
}

fn default_idle_timeout_secs() -> u64 {
    60
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            sweep_interval_secs: default_sweep_interval_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// Decryption sidecar section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptConfig {
    /// Full URL of the sidecar's decrypt endpoint.
    pub endpoint: Url,
    /// Per-request timeout in seconds.
    #[serde(default = "default_decrypt_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_decrypt_timeout_secs() -> u64 {
    10
}

impl FileConfig {
    /// Check if the admin secret is already hashed (argon2 format).
    pub fn is_admin_secret_hashed(&self) -> bool {
        self.admin.secret.starts_with("$argon2")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[server]
listen = "127.0.0.1:3000"

[admin]
secret = "test-secret"

[auth]
token_key = "seller-token-key"

[push]
debounce_ms = 250
sweep_interval_secs = 5
idle_timeout_secs = 30

[decrypt]
endpoint = "http://127.0.0.1:9090/decrypt"
timeout_secs = 3
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 3000);
        assert_eq!(config.auth.token_key, "seller-token-key");
        assert_eq!(config.push.debounce_ms, 250);
        assert_eq!(config.decrypt.endpoint.path(), "/decrypt");
        assert_eq!(config.decrypt.timeout_secs, 3);
        assert!(!config.is_admin_secret_hashed());
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let toml_str = r#"
[server]

[admin]
secret = "test-secret"

[auth]
token_key = "seller-token-key"

[decrypt]
endpoint = "https://decrypt.internal/api/v1/decrypt"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen.port(), 8080);
        assert_eq!(config.push.debounce_ms, 0);
        assert_eq!(config.push.sweep_interval_secs, 10);
        assert_eq!(config.push.idle_timeout_secs, 60);
        assert_eq!(config.decrypt.timeout_secs, 10);
    }

    #[test]
    fn test_hashed_secret_detection() {
        let toml_str = r#"
[server]

[admin]
secret = "$argon2id$v=19$m=19456,t=2,p=1$abc123"

[auth]
token_key = "seller-token-key"

[decrypt]
endpoint = "http://127.0.0.1:9090/decrypt"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.is_admin_secret_hashed());
    }
}
