//! `GET /api/v1/admin/audits`
//!
//! Lists rows from the append-only ingest ledger, newest first, with
//! optional decryption-status and admin filters. Raw payloads are
//! included so a failed decrypt can be replayed by hand.

use axum::{Json, extract::Query, response::IntoResponse};
use kanau::processor::Processor;
use paydesk_core::entities::audit_record::{AuditRecord, ListAuditRecords};
use paydesk_core::framework::DatabaseProcessor;
use paydesk_sdk::objects::admin::{AdminAuditResponse, ListAuditsQuery, clamp_pagination};

use super::AdminApiError;
use crate::api::extractors::AdminAuth;
use crate::state::AppState;

pub async fn list_audits(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
    Query(query): Query<ListAuditsQuery>,
) -> Result<impl IntoResponse, AdminApiError> {
    let (limit, offset) = clamp_pagination(query.limit, query.offset);

    let processor = DatabaseProcessor {
        pool: state.db.clone(),
    };
    let rows = processor
        .process(ListAuditRecords {
            limit,
            offset,
            status: query.status.map(Into::into),
            admin_id: query.admin_id,
        })
        .await?;

    let responses: Vec<AdminAuditResponse> = rows.iter().map(AuditRecord::to_response).collect();
    Ok(Json(responses))
}
