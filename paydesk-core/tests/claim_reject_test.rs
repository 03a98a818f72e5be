//! Claim and reject transition tests: compare-and-swap semantics,
//! terminal states, rejection history, and the pending listing.

use anyhow::Result;
use kanau::processor::Processor;
use paydesk_core::entities::pending_payment::{
    ClaimPendingPayment, CountPendingForSeller, CreatePendingPayment, GetPendingPaymentById,
    ListPendingForSeller, PendingPayment, RejectPendingPayment, TransitionError,
};
use paydesk_core::entities::rejection_record::ListRejectionsForPayment;
use paydesk_core::framework::DatabaseProcessor;
use paydesk_sdk::objects::payment::PaymentStatus;
use sqlx::PgPool;
use uuid::Uuid;

#[path = "support/mod.rs"]
mod support;

async fn create_row(pool: &PgPool, admin_id: Uuid, seller_id: Uuid) -> Result<PendingPayment> {
    let processor = DatabaseProcessor { pool: pool.clone() };
    let row = processor
        .process(CreatePendingPayment {
            admin_id,
            seller_id,
            amount: "120.00".parse()?,
            sender_name: "Fatma Y.".to_string(),
            reference_code: "TXN-77".to_string(),
        })
        .await?;
    Ok(row)
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn concurrent_claims_elect_exactly_one_winner(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let row = create_row(&pool, admin_id, seller_id).await?;

    // A double-tapped confirm button: four claim calls race on one row.
    let mut handles = Vec::new();
    for _ in 0..4 {
        let processor = DatabaseProcessor { pool: pool.clone() };
        let payment_id = row.id;
        handles.push(tokio::spawn(async move {
            processor
                .process(ClaimPendingPayment {
                    payment_id,
                    seller_id,
                })
                .await
        }));
    }

    let mut wins = 0;
    let mut losses = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => wins += 1,
            Err(TransitionError::InvalidState { current }) => {
                assert_eq!(current, PaymentStatus::Claimed);
                losses += 1;
            }
            Err(other) => anyhow::bail!("unexpected claim error: {other}"),
        }
    }
    assert_eq!(wins, 1);
    assert_eq!(losses, 3);
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn claim_stamps_the_row(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let row = create_row(&pool, admin_id, seller_id).await?;

    let processor = DatabaseProcessor { pool };
    let claimed = processor
        .process(ClaimPendingPayment {
            payment_id: row.id,
            seller_id,
        })
        .await?;

    assert_eq!(PaymentStatus::from(claimed.status), PaymentStatus::Claimed);
    assert_eq!(claimed.claimed_by, Some(seller_id));
    let confirmed_at = claimed.confirmed_at.expect("claim stamps confirmed_at");
    assert!(confirmed_at >= claimed.created_at);

    let refetched = processor
        .process(GetPendingPaymentById { payment_id: row.id })
        .await?
        .expect("row exists");
    assert_eq!(refetched, claimed);
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn second_claim_reports_current_state(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let row = create_row(&pool, admin_id, seller_id).await?;

    let processor = DatabaseProcessor { pool };
    processor
        .process(ClaimPendingPayment {
            payment_id: row.id,
            seller_id,
        })
        .await?;

    let second = processor
        .process(ClaimPendingPayment {
            payment_id: row.id,
            seller_id,
        })
        .await;
    assert!(matches!(
        second,
        Err(TransitionError::InvalidState {
            current: PaymentStatus::Claimed
        })
    ));
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn claim_of_unknown_payment_is_not_found(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;

    let processor = DatabaseProcessor { pool };
    let result = processor
        .process(ClaimPendingPayment {
            payment_id: Uuid::now_v7(),
            seller_id,
        })
        .await;
    assert!(matches!(result, Err(TransitionError::NotFound)));
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn reject_is_terminal_and_appends_record(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let row = create_row(&pool, admin_id, seller_id).await?;

    let processor = DatabaseProcessor { pool };
    let rejected = processor
        .process(RejectPendingPayment {
            payment_id: row.id,
            seller_id,
            reason: "duplicate alert, wrong till".to_string(),
        })
        .await?;

    assert_eq!(
        PaymentStatus::from(rejected.status),
        PaymentStatus::Rejected
    );
    assert_eq!(rejected.rejected_by, Some(seller_id));
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("duplicate alert, wrong till")
    );
    assert!(rejected.rejected_at.is_some());

    let history = processor
        .process(ListRejectionsForPayment { payment_id: row.id })
        .await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].seller_id, seller_id);
    assert_eq!(history[0].reason, "duplicate alert, wrong till");

    // Terminal: a later claim sees the rejected state.
    let claim = processor
        .process(ClaimPendingPayment {
            payment_id: row.id,
            seller_id,
        })
        .await;
    assert!(matches!(
        claim,
        Err(TransitionError::InvalidState {
            current: PaymentStatus::Rejected
        })
    ));
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn reject_after_claim_leaves_no_record(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;
    let row = create_row(&pool, admin_id, seller_id).await?;

    let processor = DatabaseProcessor { pool };
    processor
        .process(ClaimPendingPayment {
            payment_id: row.id,
            seller_id,
        })
        .await?;

    let reject = processor
        .process(RejectPendingPayment {
            payment_id: row.id,
            seller_id,
            reason: "changed my mind".to_string(),
        })
        .await;
    assert!(matches!(
        reject,
        Err(TransitionError::InvalidState {
            current: PaymentStatus::Claimed
        })
    ));

    // The transaction rolled back; no orphan history row.
    let history = processor
        .process(ListRejectionsForPayment { payment_id: row.id })
        .await?;
    assert!(history.is_empty());
    Ok(())
}

#[sqlx::test(migrator = "paydesk_core::MIGRATOR")]
async fn pending_listing_pages_and_filters(pool: PgPool) -> Result<()> {
    let admin_id = support::seed_admin(&pool, "Simit Corner").await?;
    let seller_id = support::seed_seller(&pool, admin_id, "till-1", true).await?;

    let oldest = create_row(&pool, admin_id, seller_id).await?;
    create_row(&pool, admin_id, seller_id).await?;
    create_row(&pool, admin_id, seller_id).await?;
    let claimed = create_row(&pool, admin_id, seller_id).await?;

    let processor = DatabaseProcessor { pool };
    processor
        .process(ClaimPendingPayment {
            payment_id: claimed.id,
            seller_id,
        })
        .await?;

    // Terminal rows stay out of the pending listing.
    let page = processor
        .process(ListPendingForSeller {
            seller_id,
            limit: 10,
            offset: 0,
            from: None,
            to: None,
        })
        .await?;
    assert_eq!(page.len(), 3);
    assert!(page.iter().all(|p| p.id != claimed.id));
    // Oldest first.
    assert_eq!(page[0].id, oldest.id);

    let total = processor
        .process(CountPendingForSeller {
            seller_id,
            from: None,
            to: None,
        })
        .await?;
    assert_eq!(total, 3);

    // limit=1 returns only the oldest row.
    let first_page = processor
        .process(ListPendingForSeller {
            seller_id,
            limit: 1,
            offset: 0,
            from: None,
            to: None,
        })
        .await?;
    assert_eq!(first_page.len(), 1);
    assert_eq!(first_page[0].id, oldest.id);

    // A window starting in the future matches nothing.
    let future = time::OffsetDateTime::now_utc().unix_timestamp() + 3600;
    let empty = processor
        .process(ListPendingForSeller {
            seller_id,
            limit: 10,
            offset: 0,
            from: Some(future),
            to: None,
        })
        .await?;
    assert!(empty.is_empty());
    let none = processor
        .process(CountPendingForSeller {
            seller_id,
            from: Some(future),
            to: None,
        })
        .await?;
    assert_eq!(none, 0);
    Ok(())
}
