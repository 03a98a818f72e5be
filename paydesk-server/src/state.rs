//! Application state shared across all request handlers.

use crate::config::runtime::SharedConfig;
use paydesk_core::processors::NotificationIngest;
use paydesk_core::push::ConnectionRegistry;
use sqlx::PgPool;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Live seller push connections.
    pub registry: Arc<ConnectionRegistry>,
    /// The ingest pipeline behind the notification endpoint.
    pub ingest: Arc<NotificationIngest>,
}

impl AppState {
    /// Create a new AppState.
    pub fn new(
        db: PgPool,
        config: SharedConfig,
        registry: Arc<ConnectionRegistry>,
        ingest: Arc<NotificationIngest>,
    ) -> Self {
        Self {
            db,
            config,
            registry,
            ingest,
        }
    }
}
