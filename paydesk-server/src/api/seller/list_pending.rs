//! `GET /api/v1/seller/payments/pending`
//!
//! Pages through the calling seller's pending rows, oldest first, with an
//! optional creation-time window. The response carries the unpaginated
//! total so the client can render "3 of 17".

use axum::{Json, extract::Query, response::IntoResponse};
use kanau::processor::Processor;
use paydesk_core::entities::pending_payment::{
    CountPendingForSeller, ListPendingForSeller, PendingPayment,
};
use paydesk_core::framework::DatabaseProcessor;
use paydesk_sdk::objects::admin::clamp_pagination;
use paydesk_sdk::objects::payment::{ListPendingQuery, PagedPayments};

use super::SellerApiError;
use crate::api::extractors::SellerAuth;
use crate::state::AppState;

pub(super) async fn list_pending(
    state: axum::extract::State<AppState>,
    auth: SellerAuth,
    Query(query): Query<ListPendingQuery>,
) -> Result<impl IntoResponse, SellerApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };

    let rows = processor
        .process(ListPendingForSeller {
            seller_id: auth.seller_id,
            limit,
            offset,
            from: query.from,
            to: query.to,
        })
        .await?;
    let total = processor
        .process(CountPendingForSeller {
            seller_id: auth.seller_id,
            from: query.from,
            to: query.to,
        })
        .await?;

    Ok(Json(PagedPayments {
        items: rows.iter().map(PendingPayment::to_response).collect(),
        total,
        limit,
        offset,
    }))
}
