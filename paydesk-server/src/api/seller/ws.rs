//! `GET /api/v1/seller/ws` — seller push WebSocket.
//!
//! Upgrades the HTTP connection and registers it with the connection
//! registry; the notification queue then pushes [`WsServerMessage`]
//! JSON frames whenever a payment is dispatched to this seller.
//!
//! Each seller holds at most one live connection. A fresh connection
//! replaces the old one: the registry sends the superseded socket an
//! `Error` frame with code [`WsCloseCode::REPLACED`], which this task
//! forwards before closing with the same code.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{CloseFrame, Message, WebSocket},
    },
    response::IntoResponse,
};
use paydesk_core::events::push_frame_channel;
use paydesk_sdk::objects::ws::{WsClientMessage, WsCloseCode, WsServerMessage};
use uuid::Uuid;

use crate::api::extractors::SellerAuth;
use crate::state::AppState;

pub(super) async fn seller_ws(
    state: State<AppState>,
    auth: SellerAuth,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let app_state = state.0.clone();
    ws.on_upgrade(move |socket| handle_seller_ws(socket, app_state, auth.seller_id))
}

/// Background task that drives a single seller connection.
///
/// 1. Registers the socket's push channel, displacing any previous
///    connection for the same seller.
/// 2. Sends a `Connected` handshake frame.
/// 3. Relays queued push frames and answers client pings until the
///    client disconnects or a newer connection takes over.
async fn handle_seller_ws(mut socket: WebSocket, state: AppState, seller_id: Uuid) {
    let (tx, mut rx) = push_frame_channel();
    let handle = state.registry.register(seller_id, tx);
    let connection_id = handle.connection_id;

    tracing::info!(%seller_id, %connection_id, "push connection opened");

    let connected = WsServerMessage::Connected {
        seller_id,
        connection_id,
    };
    if send_json(&mut socket, &connected).await.is_err() {
        state.registry.unregister_if(seller_id, connection_id);
        return;
    }

    loop {
        tokio::select! {
            frame = rx.recv() => {
                match frame {
                    Some(frame) => {
                        let replaced = matches!(
                            &frame,
                            WsServerMessage::Error { code, .. }
                                if *code == WsCloseCode::REPLACED
                        );
                        if send_json(&mut socket, &frame).await.is_err() {
                            break;
                        }
                        if replaced {
                            let _ = socket
                                .send(Message::Close(Some(CloseFrame {
                                    code: WsCloseCode::REPLACED,
                                    reason: "replaced by a newer connection".into(),
                                })))
                                .await;
                            break;
                        }
                    }
                    // Registry dropped our sender: a newer connection
                    // took the slot and its handle was already replaced.
                    None => break,
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WsClientMessage>(&text) {
                            Ok(WsClientMessage::Ping | WsClientMessage::Heartbeat) => {
                                state.registry.touch(seller_id);
                                WsServerMessage::Pong
                            }
                            Err(_) => WsServerMessage::Ack,
                        };
                        if send_json(&mut socket, &reply).await.is_err() {
                            break;
                        }
                    }
                    // Protocol-level pings count as activity too.
                    Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                        state.registry.touch(seller_id);
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        if send_json(&mut socket, &WsServerMessage::Ack).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(_)) => break,
                }
            }
        }
    }

    // Only evict the registry entry if it is still ours; a replacing
    // connection owns the slot under a different connection id.
    if state.registry.unregister_if(seller_id, connection_id) {
        tracing::info!(%seller_id, %connection_id, "push connection closed");
    }
}

/// Serialize `value` as JSON and send it as a text WebSocket frame.
///
/// Returns `Err(())` if the send fails (client disconnected).
async fn send_json<T: serde::Serialize>(socket: &mut WebSocket, value: &T) -> Result<(), ()> {
    let json = serde_json::to_string(value).map_err(|_| ())?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}
