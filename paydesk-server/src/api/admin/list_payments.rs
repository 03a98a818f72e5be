//! `GET /api/v1/admin/payments`
//!
//! Lists dispatched payment rows across all sellers, newest first, with
//! optional status and seller filters.

use axum::{Json, extract::Query, response::IntoResponse};
use kanau::processor::Processor;
use paydesk_core::entities::pending_payment::{ListPayments, PendingPayment};
use paydesk_core::framework::DatabaseProcessor;
use paydesk_sdk::objects::admin::{ListPaymentsQuery, clamp_pagination};
use paydesk_sdk::objects::payment::PaymentResponse;

use super::AdminApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

pub async fn list_payments(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let rows = processor
        .process(ListPayments {
            limit,
            offset,
            status: query.status.map(Into::into),
            seller_id: query.seller_id,
        })
        .await?;

    let responses: Vec<PaymentResponse> = rows.iter().map(PendingPayment::to_response).collect();
    Ok(Json(responses))
}
