//! Admin API: ops visibility into payments, the ingest ledger, and live
//! push connections. Every route authenticates through [`AdminAuth`].
//!
//! [`AdminAuth`]: crate::api::extractors::AdminAuth

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::api::error_response;
use crate::state::AppState;

mod connections;
mod list_audits;
mod list_payments;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments::list_payments))
        .route("/audits", get(list_audits::list_audits))
        .route("/connections", get(connections::list_connections))
}

/// Errors returned by the admin listing handlers.
#[derive(Debug, thiserror::Error)]
pub enum AdminApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        match self {
            AdminApiError::Database(e) => {
                tracing::error!(error = %e, "admin api database error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}
