//! `POST /api/v1/seller/payments/{payment_id}/claim`
//!
//! Marks a pending payment as confirmed by the calling seller. The
//! transition is a compare-and-set on the row's status, so two operators
//! racing for the same row resolve to exactly one winner; the loser gets
//! a 409 naming the row's current status.

use axum::{Json, extract::Path, response::IntoResponse};
use kanau::processor::Processor;
use paydesk_core::entities::pending_payment::{ClaimPendingPayment, GetPendingPaymentById};
use paydesk_core::framework::DatabaseProcessor;
use uuid::Uuid;

use super::SellerApiError;
use crate::api::extractors::SellerAuth;
use crate::state::AppState;

pub(super) async fn claim_payment(
    state: axum::extract::State<AppState>,
    auth: SellerAuth,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, SellerApiError> {
    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    // Ownership check before the transition: a seller must never learn
    // another seller's row state through the status-conflict error.
    let row = processor
        .process(GetPendingPaymentById { payment_id })
        .await?
        .ok_or(SellerApiError::NotFound)?;
    if row.seller_id != auth.seller_id {
        return Err(SellerApiError::NotOwned);
    }

    let claimed = processor
        .process(ClaimPendingPayment {
            payment_id,
            seller_id: auth.seller_id,
        })
        .await?;

    tracing::info!(
        payment_id = %claimed.id,
        seller_id = %auth.seller_id,
        "payment claimed"
    );

    Ok(Json(claimed.to_response()))
}
