//! `POST /api/v1/seller/payments/{payment_id}/reject`
//!
//! Marks a pending payment as rejected and appends the operator's reason
//! to the rejection history. Rejection is terminal; the row and the
//! history record are written in one transaction.

use axum::{Json, extract::Path, response::IntoResponse};
use kanau::processor::Processor;
use paydesk_core::entities::pending_payment::{GetPendingPaymentById, RejectPendingPayment};
use paydesk_core::framework::DatabaseProcessor;
use paydesk_sdk::objects::payment::RejectRequest;
use uuid::Uuid;

use super::SellerApiError;
use crate::api::extractors::SellerAuth;
use crate::state::AppState;

pub(super) async fn reject_payment(
    state: axum::extract::State<AppState>,
    auth: SellerAuth,
    Path(payment_id): Path<Uuid>,
    Json(body): Json<RejectRequest>,
) -> Result<impl IntoResponse, SellerApiError> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(SellerApiError::EmptyReason);
    }

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let row = processor
        .process(GetPendingPaymentById { payment_id })
        .await?
        .ok_or(SellerApiError::NotFound)?;
    if row.seller_id != auth.seller_id {
        return Err(SellerApiError::NotOwned);
    }

    let rejected = processor
        .process(RejectPendingPayment {
            payment_id,
            seller_id: auth.seller_id,
            reason: reason.to_owned(),
        })
        .await?;

    tracing::info!(
        payment_id = %rejected.id,
        seller_id = %auth.seller_id,
        "payment rejected"
    );

    Ok(Json(rejected.to_response()))
}
