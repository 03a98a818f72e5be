//! End-to-end ingest pipeline tests: validation, dedup, decryption,
//! fan-out, audit linking, and push delivery against a real database.

use anyhow::Result;
use kanau::processor::Processor;
use paydesk_core::entities::DecryptionStatus;
use paydesk_core::entities::audit_record::GetAuditRecordById;
use paydesk_core::entities::pending_payment::{ClaimPendingPayment, GetPendingPaymentById};
use paydesk_core::events::push_frame_channel;
use paydesk_core::framework::DatabaseProcessor;
use paydesk_core::processors::{DispatchError, IngestError};
use paydesk_sdk::objects::payment::PaymentStatus;
use paydesk_sdk::objects::ws::WsServerMessage;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

#[path = "support/mod.rs"]
mod support;

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn fanout_creates_one_row_per_active_seller(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Kumru Cafe").await?;
    let till_1 = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let till_2 = support::seed_seller(&pool, admin_id, "till-2", true).await?;
    let back_office = support::seed_seller(&pool, admin_id, "back-office", true).await?;
    let dormant = support::seed_seller(&pool, admin_id, "old-phone", false).await?;

    let stack = support::build_stack(
        pool.clone(),
        support::StubDecryptor::ok("149.90", "Mehmet D.", "TXN-554"),
    );
    let ack = stack.ingest.accept(support::submit(admin_id, "evt-1")).await?;

    assert_eq!(ack.sellers_notified, 3);
    // The ack carries the row of the oldest seller.
    assert_eq!(ack.payment.seller_id, till_1);
    assert_eq!(ack.payment.status, PaymentStatus::Pending);
    assert_eq!(ack.payment.amount, "149.90".parse()?);

    let seller_rows: Vec<Uuid> = sqlx::query_scalar(
        "SELECT seller_id FROM pending_payments WHERE admin_id = $1 AND status = 'pending'",
    )
    .bind(admin_id)
    .fetch_all(&pool)
    .await?;
    assert_eq!(seller_rows.len(), 3);
    assert!(seller_rows.contains(&till_1));
    assert!(seller_rows.contains(&till_2));
    assert!(seller_rows.contains(&back_office));
    assert!(!seller_rows.contains(&dormant));

    // The audit row records the decrypt outcome and links the first row.
    let processor = DatabaseProcessor { pool };
    let audit = processor
        .process(GetAuditRecordById {
            audit_id: ack.audit_id,
        })
        .await?
        .expect("audit row exists");
    assert_eq!(audit.decryption_status, DecryptionStatus::Success);
    assert_eq!(audit.extracted_amount, Some("149.90".parse()?));
    assert_eq!(audit.extracted_sender.as_deref(), Some("Mehmet D."));
    assert_eq!(audit.extracted_reference.as_deref(), Some("TXN-554"));
    assert_eq!(audit.linked_payment_id, Some(ack.payment.payment_id));
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn duplicate_event_is_refused(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Kumru Cafe").await?;
    support::seed_seller(&pool, admin_id, "till-1", true).await?;

    let stack = support::build_stack(
        pool.clone(),
        support::StubDecryptor::ok("32.00", "Zeynep A.", "TXN-555"),
    );
    stack
        .ingest
        .accept(support::submit(admin_id, "evt-dup"))
        .await?;

    let second = stack
        .ingest
        .accept(support::submit(admin_id, "evt-dup"))
        .await;
    assert!(matches!(second, Err(IngestError::DuplicateEvent)));

    let audits: i64 = sqlx::query_scalar("SELECT count(*) FROM audit_records")
        .fetch_one(&pool)
        .await?;
    assert_eq!(audits, 1);
    let payments: i64 = sqlx::query_scalar("SELECT count(*) FROM pending_payments")
        .fetch_one(&pool)
        .await?;
    assert_eq!(payments, 1);
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn decrypt_failure_marks_audit_and_skips_fanout(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Kumru Cafe").await?;
    support::seed_seller(&pool, admin_id, "till-1", true).await?;

    let stack = support::build_stack(
        pool.clone(),
        support::StubDecryptor::failing("unknown device key"),
    );
    let result = stack
        .ingest
        .accept(support::submit(admin_id, "evt-bad"))
        .await;
    assert!(matches!(result, Err(IngestError::Decryption(_))));

    let (status, error, linked): (DecryptionStatus, Option<String>, Option<Uuid>) =
        sqlx::query_as(
            "SELECT decryption_status, decrypt_error, linked_payment_id FROM audit_records",
        )
        .fetch_one(&pool)
        .await?;
    assert_eq!(status, DecryptionStatus::Failed);
    assert!(error.unwrap_or_default().contains("unknown device key"));
    assert_eq!(linked, None);

    let payments: i64 = sqlx::query_scalar("SELECT count(*) FROM pending_payments")
        .fetch_one(&pool)
        .await?;
    assert_eq!(payments, 0);
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn event_without_active_sellers_is_refused(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Kumru Cafe").await?;
    support::seed_seller(&pool, admin_id, "old-phone", false).await?;

    let stack = support::build_stack(
        pool.clone(),
        support::StubDecryptor::ok("10.00", "Ali V.", "TXN-556"),
    );
    let result = stack
        .ingest
        .accept(support::submit(admin_id, "evt-empty"))
        .await;
    assert!(matches!(
        result,
        Err(IngestError::Dispatch(DispatchError::NoSellersFound))
    ));

    // The event is still on the ledger, decrypted but unlinked.
    let (status, linked): (DecryptionStatus, Option<Uuid>) =
        sqlx::query_as("SELECT decryption_status, linked_payment_id FROM audit_records")
            .fetch_one(&pool)
            .await?;
    assert_eq!(status, DecryptionStatus::Success);
    assert_eq!(linked, None);

    let payments: i64 = sqlx::query_scalar("SELECT count(*) FROM pending_payments")
        .fetch_one(&pool)
        .await?;
    assert_eq!(payments, 0);
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn connected_seller_receives_exactly_one_frame(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Kumru Cafe").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;

    let stack = support::build_stack(
        pool.clone(),
        support::StubDecryptor::ok("75.25", "Hülya B.", "TXN-557"),
    );
    let (tx, mut rx) = push_frame_channel();
    stack.registry.register(seller_id, tx);

    let ack = stack
        .ingest
        .accept(support::submit(admin_id, "evt-push"))
        .await?;

    let frame = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await?;
    match frame {
        Some(WsServerMessage::PaymentNotification { payment }) => {
            assert_eq!(payment.payment_id, ack.payment.payment_id);
            assert_eq!(payment.seller_id, seller_id);
            assert_eq!(payment.amount, "75.25".parse()?);
        }
        other => anyhow::bail!("expected payment notification, got {other:?}"),
    }
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn sibling_rows_stay_independent(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Kumru Cafe").await?;
    let till_1 = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let till_2 = support::seed_seller(&pool, admin_id, "till-2", true).await?;

    let stack = support::build_stack(
        pool.clone(),
        support::StubDecryptor::ok("60.00", "Kerem T.", "TXN-558"),
    );
    let ack = stack
        .ingest
        .accept(support::submit(admin_id, "evt-sib"))
        .await?;
    assert_eq!(ack.sellers_notified, 2);

    let processor = DatabaseProcessor { pool: pool.clone() };
    let second_row: (Uuid,) =
        sqlx::query_as("SELECT id FROM pending_payments WHERE seller_id = $1")
            .bind(till_2)
            .fetch_one(&pool)
            .await?;

    // till-2 claims their copy; till-1's row must stay pending.
    processor
        .process(ClaimPendingPayment {
            payment_id: second_row.0,
            seller_id: till_2,
        })
        .await?;

    let first_row = processor
        .process(GetPendingPaymentById {
            payment_id: ack.payment.payment_id,
        })
        .await?
        .expect("sibling row exists");
    assert_eq!(first_row.seller_id, till_1);
    assert_eq!(
        PaymentStatus::from(first_row.status),
        PaymentStatus::Pending
    );
    Ok(())
}
