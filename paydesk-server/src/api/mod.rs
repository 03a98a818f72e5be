//! HTTP API surface.
//!
//! Three nested routers share the [`AppState`](crate::state::AppState):
//!
//! - `service` — device-facing notification ingest (signed bodies)
//! - `seller`  — claim/reject/list plus the push WebSocket (bearer tokens)
//! - `admin`   — ops dashboard (admin secret header)

pub mod admin;
pub mod extractors;
pub mod seller;
pub mod service;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON error body returned by every API surface.
#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    /// Stable machine-readable code.
    pub error: &'static str,
    /// Human-readable detail.
    pub message: String,
}

/// Build an error response with the shared JSON shape.
pub(crate) fn error_response(
    status: StatusCode,
    error: &'static str,
    message: impl Into<String>,
) -> Response {
    (
        status,
        Json(ErrorBody {
            error,
            message: message.into(),
        }),
    )
        .into_response()
}
