//! Fan-out dispatcher.
//!
//! Takes one decrypted alert and creates an independently claimable
//! payment row for every active seller of the admin, enqueuing a push
//! notification per row.  Row inserts run concurrently; the dispatch as a
//! whole succeeds only if every insert succeeded.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use crate::directory::{DirectoryError, SellerDirectory};
use crate::entities::pending_payment::{CreatePendingPayment, PendingPayment};
use crate::framework::DatabaseProcessor;
use crate::push::NotificationQueue;
use kanau::processor::Processor;

/// Errors that can occur during fan-out.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The admin has no active sellers to dispatch to
    #[error("admin has no active sellers")]
    NoSellersFound,

    /// Some row inserts failed; the created rows stand
    #[error("fan-out incomplete: {created} rows created, {failed} failed")]
    FanoutIncomplete { created: usize, failed: usize },

    /// Seller directory lookup failed
    #[error("directory error: {0}")]
    Directory(#[from] DirectoryError),
}

/// What a successful dispatch produced.
#[derive(Debug, Clone)]
pub struct FanoutReceipt {
    /// The row created for the admin's first seller, returned to the
    /// submitting device as the acknowledgment.
    pub first: PendingPayment,
    /// How many sellers got a row.
    pub sellers_notified: u32,
}

/// Creates payment rows and enqueues pushes for one decrypted alert.
pub struct FanoutDispatcher {
    pool: PgPool,
    directory: Arc<dyn SellerDirectory>,
    queue: Arc<NotificationQueue>,
}

impl FanoutDispatcher {
    pub fn new(
        pool: PgPool,
        directory: Arc<dyn SellerDirectory>,
        queue: Arc<NotificationQueue>,
    ) -> Self {
        Self {
            pool,
            directory,
            queue,
        }
    }

    /// Fan one alert out to every active seller of `admin_id`.
    ///
    /// Inserts run as concurrent tasks and are awaited in seller order, so
    /// `first` in the receipt is deterministic.  Sibling rows are fully
    /// independent: each seller claims or rejects their own copy and a
    /// partial failure leaves the successful rows in place.
    #[tracing::instrument(skip_all, fields(%admin_id))]
    pub async fn dispatch(
        &self,
        admin_id: Uuid,
        amount: Decimal,
        sender_name: &str,
        reference_code: &str,
    ) -> Result<FanoutReceipt, DispatchError> {
        let sellers = self.directory.active_sellers(admin_id).await?;
        if sellers.is_empty() {
            return Err(DispatchError::NoSellersFound);
        }

        let mut handles = Vec::with_capacity(sellers.len());
        for seller_id in sellers {
            let pool = self.pool.clone();
            let queue = Arc::clone(&self.queue);
            let cmd = CreatePendingPayment {
                admin_id,
                seller_id,
                amount,
                sender_name: sender_name.to_owned(),
                reference_code: reference_code.to_owned(),
            };
            handles.push(tokio::spawn(async move {
                let processor = DatabaseProcessor { pool };
                let row = processor.process(cmd).await?;
                queue.enqueue(seller_id, row.to_response());
                Ok::<PendingPayment, sqlx::Error>(row)
            }));
        }

        let mut first: Option<PendingPayment> = None;
        let mut created = 0usize;
        let mut failed = 0usize;
        for handle in handles {
            match handle.await {
                Ok(Ok(row)) => {
                    created += 1;
                    if first.is_none() {
                        first = Some(row);
                    }
                }
                Ok(Err(e)) => {
                    failed += 1;
                    error!(error = %e, "payment row insert failed during fan-out");
                }
                Err(e) => {
                    failed += 1;
                    error!(error = %e, "fan-out task aborted");
                }
            }
        }

        match first {
            Some(first) if failed == 0 => Ok(FanoutReceipt {
                sellers_notified: created as u32,
                first,
            }),
            _ => Err(DispatchError::FanoutIncomplete { created, failed }),
        }
    }
}
