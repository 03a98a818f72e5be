//! Service API: the authenticated ingest endpoint for admin devices.
//!
//! A forwarder app on the admin's phone posts each captured payment alert
//! here as a signed JSON body. The handler runs the full ingest pipeline
//! (validate, dedup, decrypt, fan out, push) and returns the created audit
//! id plus the caller's own pending row.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use paydesk_core::processors::dispatcher::DispatchError;
use paydesk_core::processors::ingest::IngestError;
use paydesk_sdk::objects::submit::{NotificationAck, SubmitNotification};

use crate::api::{error_response, extractors::SignedBody};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", post(submit_notification))
}

/// `POST /api/v1/service/notifications`
///
/// Body: [`SubmitNotification`], signed with the admin's device secret
/// via the `Paydesk-Signature` header.
async fn submit_notification(
    state: axum::extract::State<AppState>,
    SignedBody(submit): SignedBody<SubmitNotification>,
) -> Result<impl IntoResponse, ServiceApiError> {
    let ack: NotificationAck = state.ingest.accept(submit).await?;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// Maps ingest pipeline failures onto HTTP statuses.
///
/// Client-side problems (bad payload, stale clock, retried delivery) get
/// 4xx so the forwarder can stop retrying; decrypt sidecar failures get
/// 502 so it retries later.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ServiceApiError(#[from] IngestError);

impl IntoResponse for ServiceApiError {
    fn into_response(self) -> axum::response::Response {
        match self.0 {
            IngestError::Validation(e) => {
                error_response(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
            }
            err @ IngestError::StaleEvent { .. } => {
                error_response(StatusCode::UNPROCESSABLE_ENTITY, "stale_event", err.to_string())
            }
            IngestError::DuplicateEvent => error_response(
                StatusCode::CONFLICT,
                "duplicate_event",
                "this event was already recorded",
            ),
            IngestError::Decryption(e) => {
                error_response(StatusCode::BAD_GATEWAY, "decryption_failure", e.to_string())
            }
            IngestError::Dispatch(DispatchError::NoSellersFound) => error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "no_sellers_found",
                "admin has no active sellers",
            ),
            err @ IngestError::Dispatch(_) => {
                tracing::error!(error = %err, "notification dispatch failed");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
            IngestError::Database(e) => {
                tracing::error!(error = %e, "notification ingest database error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}
