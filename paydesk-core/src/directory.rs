//! Seller directory lookups.
//!
//! The dispatcher asks the directory which sellers an event fans out to.
//! Directory rows are managed out of band, so the production impl is a
//! thin read of the `sellers` table; tests swap in a fixed list.

use async_trait::async_trait;
use kanau::processor::Processor;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::seller::GetActiveSellersOfAdmin;
use crate::framework::DatabaseProcessor;

/// Errors produced by directory lookups.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Trait for resolving an admin's fan-out set.
#[async_trait]
pub trait SellerDirectory: Send + Sync {
    /// Ids of the admin's active sellers, in stable order.
    async fn active_sellers(&self, admin_id: Uuid) -> Result<Vec<Uuid>, DirectoryError>;
}

/// Directory backed by the `sellers` table.
pub struct DbSellerDirectory {
    pool: PgPool,
}

impl DbSellerDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SellerDirectory for DbSellerDirectory {
    async fn active_sellers(&self, admin_id: Uuid) -> Result<Vec<Uuid>, DirectoryError> {
        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };
        let sellers = processor.process(GetActiveSellersOfAdmin { admin_id }).await?;
        Ok(sellers)
    }
}
