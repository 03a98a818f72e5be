//! Notification ingest.
//!
//! The single entry point for an admin device's encrypted payment alert.
//! The chain is: structural validation, staleness gate, audit ledger
//! insert (where the dedup hash makes retried deliveries idempotent),
//! decryption, fan-out, and finally linking the audit row to the first
//! payment row.  Nothing is written before the staleness gate passes.

use paydesk_sdk::objects::submit::{NotificationAck, SubmitNotification, ValidationError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::decrypt::{AlertDecryptor, DecryptError};
use crate::entities::audit_record::{
    CreateAuditError, CreateAuditRecord, LinkAuditPayment, MarkDecryptFailed, MarkDecryptSucceeded,
};
use crate::framework::DatabaseProcessor;
use crate::processors::dispatcher::{DispatchError, FanoutDispatcher};
use kanau::processor::Processor;

/// Maximum |now − event_timestamp| before an event is refused, in seconds.
///
/// Device clocks drift and deliveries get retried; five minutes covers
/// both without letting a replayed capture from yesterday through.
pub const MAX_EVENT_SKEW_SECS: i64 = 5 * 60;

/// Errors that can occur during ingest.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The notification failed structural validation
    #[error("invalid notification: {0}")]
    Validation(#[from] ValidationError),

    /// The event timestamp is outside the accepted window
    #[error("event timestamp is {skew_secs}s away from server time (max {MAX_EVENT_SKEW_SECS}s)")]
    StaleEvent { skew_secs: i64 },

    /// The dedup hash was already recorded; this is a retried delivery
    #[error("duplicate event")]
    DuplicateEvent,

    /// The payload could not be decrypted; the audit row records the error
    #[error("decryption failed: {0}")]
    Decryption(#[from] DecryptError),

    /// Fan-out failed after a successful decrypt
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Database error outside the dedup path
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

/// Validates, records, decrypts, and dispatches one notification event.
pub struct NotificationIngest {
    pool: PgPool,
    decryptor: Arc<dyn AlertDecryptor>,
    dispatcher: FanoutDispatcher,
}

impl NotificationIngest {
    pub fn new(
        pool: PgPool,
        decryptor: Arc<dyn AlertDecryptor>,
        dispatcher: FanoutDispatcher,
    ) -> Self {
        Self {
            pool,
            decryptor,
            dispatcher,
        }
    }

    /// Accept one submitted notification event.
    ///
    /// On success the returned ack carries the audit id, the first created
    /// payment row, and the fan-out count.  A duplicate delivery fails
    /// with [`IngestError::DuplicateEvent`] and leaves the ledger
    /// untouched.
    #[tracing::instrument(skip_all, fields(admin_id = %submit.admin_id))]
    pub async fn accept(&self, submit: SubmitNotification) -> Result<NotificationAck, IngestError> {
        submit.validate()?;

        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        let skew_secs = (now - submit.event_timestamp).abs();
        if skew_secs > MAX_EVENT_SKEW_SECS {
            return Err(IngestError::StaleEvent { skew_secs });
        }

        let processor = DatabaseProcessor {
            pool: self.pool.clone(),
        };

        let audit = processor
            .process(CreateAuditRecord {
                admin_id: submit.admin_id,
                raw_payload: submit.payload.clone(),
                device_fingerprint: submit.device_fingerprint.clone(),
                event_timestamp: submit.event_timestamp,
                dedup_hash: submit.dedup_hash.clone(),
            })
            .await
            .map_err(|e| match e {
                CreateAuditError::Duplicate => IngestError::DuplicateEvent,
                CreateAuditError::Database(e) => IngestError::Database(e),
            })?;

        let alert = match self
            .decryptor
            .decrypt(&submit.payload, &submit.device_fingerprint)
            .await
        {
            Ok(alert) => alert,
            Err(e) => {
                warn!(audit_id = %audit.id, error = %e, "payload decryption failed");
                processor
                    .process(MarkDecryptFailed {
                        audit_id: audit.id,
                        error: e.to_string(),
                    })
                    .await
                    .map_err(IngestError::Database)?;
                return Err(IngestError::Decryption(e));
            }
        };

        processor
            .process(MarkDecryptSucceeded {
                audit_id: audit.id,
                amount: alert.amount,
                sender_name: alert.sender_name.clone(),
                reference_code: alert.transaction_id.clone(),
            })
            .await
            .map_err(IngestError::Database)?;

        let receipt = self
            .dispatcher
            .dispatch(
                submit.admin_id,
                alert.amount,
                &alert.sender_name,
                &alert.transaction_id,
            )
            .await?;

        processor
            .process(LinkAuditPayment {
                audit_id: audit.id,
                payment_id: receipt.first.id,
            })
            .await
            .map_err(IngestError::Database)?;

        info!(
            audit_id = %audit.id,
            payment_id = %receipt.first.id,
            sellers = receipt.sellers_notified,
            "notification dispatched"
        );

        Ok(NotificationAck {
            audit_id: audit.id,
            payment: receipt.first.to_response(),
            sellers_notified: receipt.sellers_notified,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::decrypt::DecryptedAlert;
    use crate::directory::{DirectoryError, SellerDirectory};
    use crate::push::{ConnectionRegistry, NotificationQueue};
    use async_trait::async_trait;
    use std::time::Duration;
    use uuid::Uuid;

    struct NeverDecryptor;

    #[async_trait]
    impl AlertDecryptor for NeverDecryptor {
        async fn decrypt(&self, _: &str, _: &str) -> Result<DecryptedAlert, DecryptError> {
            Err(DecryptError::Rejected {
                reason: "not reachable from these tests".to_string(),
            })
        }
    }

    struct EmptyDirectory;

    #[async_trait]
    impl SellerDirectory for EmptyDirectory {
        async fn active_sellers(&self, _: Uuid) -> Result<Vec<Uuid>, DirectoryError> {
            Ok(Vec::new())
        }
    }

    // The pool is lazy and points nowhere; tests that reach the database
    // see a fast acquire failure instead of a live server.
    fn ingest() -> NotificationIngest {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(100))
            .connect_lazy("postgres://paydesk@127.0.0.1:1/paydesk")
            .unwrap();
        let registry = Arc::new(ConnectionRegistry::new(Duration::from_secs(60)));
        let queue = Arc::new(NotificationQueue::new(registry, Duration::ZERO));
        let dispatcher = FanoutDispatcher::new(pool.clone(), Arc::new(EmptyDirectory), queue);
        NotificationIngest::new(pool, Arc::new(NeverDecryptor), dispatcher)
    }

    fn submit(event_timestamp: i64) -> SubmitNotification {
        SubmitNotification {
            admin_id: Uuid::now_v7(),
            payload: "ZW5jcnlwdGVk".to_string(),
            device_fingerprint: "pixel-8a:3f".to_string(),
            event_timestamp,
            dedup_hash: "h1".to_string(),
        }
    }

    #[tokio::test]
    async fn stale_event_is_refused_before_any_write() {
        let ingest = ingest();
        let now = time::OffsetDateTime::now_utc().unix_timestamp();

        let result = ingest.accept(submit(now - MAX_EVENT_SKEW_SECS - 1)).await;
        assert!(matches!(result, Err(IngestError::StaleEvent { .. })));
    }

    #[tokio::test]
    async fn future_skew_is_refused_too() {
        let ingest = ingest();
        let now = time::OffsetDateTime::now_utc().unix_timestamp();

        let result = ingest.accept(submit(now + MAX_EVENT_SKEW_SECS + 60)).await;
        assert!(matches!(result, Err(IngestError::StaleEvent { .. })));
    }

    #[tokio::test]
    async fn skew_inside_the_window_passes_the_gate() {
        let ingest = ingest();
        let now = time::OffsetDateTime::now_utc().unix_timestamp();

        // Gets past validation and staleness, then dies on the dead pool.
        let result = ingest.accept(submit(now - MAX_EVENT_SKEW_SECS + 5)).await;
        assert!(matches!(result, Err(IngestError::Database(_))));
    }

    #[tokio::test]
    async fn invalid_notification_is_refused() {
        let ingest = ingest();
        let now = time::OffsetDateTime::now_utc().unix_timestamp();

        let mut bad = submit(now);
        bad.payload.clear();
        let result = ingest.accept(bad).await;
        assert!(matches!(
            result,
            Err(IngestError::Validation(ValidationError::EmptyPayload))
        ));
    }
}
