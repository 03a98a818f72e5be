//! `GET /api/v1/admin/connections`
//!
//! Snapshot of sellers currently holding an open push WebSocket.

use axum::{Json, response::IntoResponse};
use paydesk_sdk::objects::admin::ConnectionsResponse;

use crate::api::extractors::AdminAuth;
use crate::state::AppState;

pub async fn list_connections(
    state: axum::extract::State<AppState>,
    _auth: AdminAuth,
) -> impl IntoResponse {
    Json(ConnectionsResponse {
        count: state.registry.connected_count(),
        seller_ids: state.registry.connected_sellers(),
    })
}
