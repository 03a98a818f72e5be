//! Validated runtime configuration shared across crates.
//!
//! These types represent the validated runtime configuration used by the
//! server. The actual config loading/parsing is handled by the server
//! crate.

mod admin;
mod auth;
mod decrypt;
mod push;
mod server;

pub use admin::AdminConfig;
pub use auth::AuthConfig;
pub use decrypt::DecryptConfig;
pub use push::PushConfig;
pub use server::ServerConfig;

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// This allows independent access to different configuration sections
/// without blocking other readers/writers.
#[derive(Clone)]
pub struct SharedConfig {
    /// Server configuration (listen address).
    pub server: Arc<RwLock<ServerConfig>>,
    /// Ops API authentication.
    pub admin: Arc<RwLock<AdminConfig>>,
    /// Seller bearer-token signing key.
    pub auth: Arc<RwLock<AuthConfig>>,
    /// Push delivery tuning.
    pub push: Arc<RwLock<PushConfig>>,
    /// Decryption sidecar endpoint.
    pub decrypt: Arc<RwLock<DecryptConfig>>,
}

impl SharedConfig {
    /// Create a new SharedConfig from individual configuration parts.
    pub fn new(
        server: ServerConfig,
        admin: AdminConfig,
        auth: AuthConfig,
        push: PushConfig,
        decrypt: DecryptConfig,
    ) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            admin: Arc::new(RwLock::new(admin)),
            auth: Arc::new(RwLock::new(auth)),
            push: Arc::new(RwLock::new(push)),
            decrypt: Arc::new(RwLock::new(decrypt)),
        }
    }

    /// Get a read lock on the server configuration.
    pub async fn server(&self) -> tokio::sync::RwLockReadGuard<'_, ServerConfig> {
        self.server.read().await
    }

    /// Get a read lock on the admin configuration.
    pub async fn admin(&self) -> tokio::sync::RwLockReadGuard<'_, AdminConfig> {
        self.admin.read().await
    }

    /// Get a read lock on the auth configuration.
    pub async fn auth(&self) -> tokio::sync::RwLockReadGuard<'_, AuthConfig> {
        self.auth.read().await
    }

    /// Get a read lock on the push configuration.
    pub async fn push(&self) -> tokio::sync::RwLockReadGuard<'_, PushConfig> {
        self.push.read().await
    }

    /// Get a read lock on the decrypt configuration.
    pub async fn decrypt(&self) -> tokio::sync::RwLockReadGuard<'_, DecryptConfig> {
        self.decrypt.read().await
    }

    /// Update the server configuration.
    pub async fn update_server(&self, config: ServerConfig) {
        let mut server = self.server.write().await;
        *server = config;
    }

    /// Update the admin configuration.
    pub async fn update_admin(&self, config: AdminConfig) {
        let mut admin = self.admin.write().await;
        *admin = config;
    }

    /// Update the auth configuration.
    pub async fn update_auth(&self, config: AuthConfig) {
        let mut auth = self.auth.write().await;
        *auth = config;
    }

    /// Update the push configuration.
    pub async fn update_push(&self, config: PushConfig) {
        let mut push = self.push.write().await;
        *push = config;
    }

    /// Update the decrypt configuration.
    pub async fn update_decrypt(&self, config: DecryptConfig) {
        let mut decrypt = self.decrypt.write().await;
        *decrypt = config;
    }

    /// Update all configuration sections at once.
    pub async fn update_all(
        &self,
        server: ServerConfig,
        admin: AdminConfig,
        auth: AuthConfig,
        push: PushConfig,
        decrypt: DecryptConfig,
    ) {
        // Update in sequence to avoid potential deadlocks
        self.update_server(server).await;
        self.update_admin(admin).await;
        self.update_auth(auth).await;
        self.update_push(push).await;
        self.update_decrypt(decrypt).await;
    }
}
