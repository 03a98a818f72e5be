//! Seller API: claim/reject operations, pending listings, and the push
//! WebSocket. Every route authenticates through [`SellerAuth`].
//!
//! [`SellerAuth`]: crate::api::extractors::SellerAuth

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use paydesk_core::entities::pending_payment::TransitionError;

use crate::api::error_response;
use crate::state::AppState;

mod claim;
mod list_pending;
mod reject;
mod ws;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments/{payment_id}/claim", post(claim::claim_payment))
        .route("/payments/{payment_id}/reject", post(reject::reject_payment))
        .route("/payments/pending", get(list_pending::list_pending))
        .route("/ws", get(ws::seller_ws))
}

/// Errors shared by the claim, reject, and listing handlers.
#[derive(Debug, thiserror::Error)]
pub enum SellerApiError {
    #[error("payment not found")]
    NotFound,
    #[error("payment belongs to another seller")]
    NotOwned,
    #[error("payment is not pending (current status: {current})")]
    InvalidState {
        current: paydesk_sdk::objects::payment::PaymentStatus,
    },
    #[error("rejection reason must not be empty")]
    EmptyReason,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<TransitionError> for SellerApiError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::NotFound => Self::NotFound,
            TransitionError::InvalidState { current } => Self::InvalidState { current },
            TransitionError::Database(e) => Self::Database(e),
        }
    }
}

impl IntoResponse for SellerApiError {
    fn into_response(self) -> Response {
        match self {
            SellerApiError::NotFound => {
                error_response(StatusCode::NOT_FOUND, "not_found", "payment not found")
            }
            SellerApiError::NotOwned => error_response(
                StatusCode::FORBIDDEN,
                "not_owned",
                "payment belongs to another seller",
            ),
            err @ SellerApiError::InvalidState { .. } => {
                error_response(StatusCode::CONFLICT, "invalid_state", err.to_string())
            }
            SellerApiError::EmptyReason => error_response(
                StatusCode::BAD_REQUEST,
                "empty_reason",
                "rejection reason must not be empty",
            ),
            SellerApiError::Database(e) => {
                tracing::error!(error = %e, "seller api database error");
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal server error",
                )
            }
        }
    }
}
