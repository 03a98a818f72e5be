//! WebSocket message types for the seller push stream.
//!
//! The `GET /api/v1/seller/ws` endpoint upgrades to a WebSocket connection
//! and pushes [`WsServerMessage`] JSON frames.
//!
//! # Protocol
//!
//! 1. The server sends [`WsServerMessage::Connected`] immediately after the
//!    upgrade.
//! 2. Payment alerts arrive as [`WsServerMessage::PaymentNotification`]
//!    frames, or as one [`WsServerMessage::GroupedPaymentNotification`]
//!    when several alerts were coalesced in the same flush window.
//! 3. The client keeps the connection alive by sending
//!    [`WsClientMessage::Ping`] or [`WsClientMessage::Heartbeat`]; the
//!    server answers with [`WsServerMessage::Pong`]. A connection idle for
//!    longer than the server's timeout is dropped.
//! 4. Any other inbound frame is acknowledged with [`WsServerMessage::Ack`]
//!    and otherwise ignored.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentResponse;

/// Server-to-client WebSocket message.
///
/// Serialized as an internally-tagged JSON object so the client can
/// dispatch on the `"type"` field:
///
/// ```json
/// {"type":"payment_notification","payment":{ ... }}
/// {"type":"grouped_payment_notification","count":3,"total_amount":"150.00","items":[ ... ]}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// Handshake confirmation, sent once per connection.
    Connected {
        /// The authenticated seller.
        seller_id: Uuid,
        /// Identifier of this connection instance.
        connection_id: Uuid,
    },

    /// A single payment alert.
    PaymentNotification {
        /// Full payment row state at push time.
        payment: PaymentResponse,
    },

    /// Several payment alerts coalesced into one frame.
    GroupedPaymentNotification {
        /// Number of alerts in this group.
        count: u32,
        /// Sum of the grouped amounts.
        total_amount: rust_decimal::Decimal,
        /// The grouped rows, in arrival order.
        items: Vec<PaymentResponse>,
    },

    /// Reply to [`WsClientMessage::Ping`] / [`WsClientMessage::Heartbeat`].
    Pong,

    /// Generic acknowledgement for frames the server does not interpret.
    Ack,

    /// A server-side error that does **not** close the connection by
    /// itself.  The server may still send a close frame afterwards.
    Error {
        /// Application-level error code (mirrors [`WsCloseCode`] values
        /// where applicable).
        code: u16,
        /// Human-readable reason.
        reason: CompactString,
    },
}

/// Client-to-server WebSocket message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    /// Liveness probe; refreshes the connection's activity stamp.
    Ping,
    /// Alias for [`Ping`](Self::Ping) kept for older device firmware.
    Heartbeat,
}

/// Well-known WebSocket close codes used by the seller push stream.
///
/// Codes in the 4000–4999 range are reserved for application use by
/// [RFC 6455 §7.4.2](https://www.rfc-editor.org/rfc/rfc6455#section-7.4.2).
pub struct WsCloseCode;

impl WsCloseCode {
    /// Normal closure (server shutdown, seller logout).
    pub const NORMAL: u16 = 1000;

    /// An unexpected server-side error prevented the connection from
    /// continuing.
    pub const INTERNAL_ERROR: u16 = 1011;

    /// The bearer token was missing or failed verification.
    pub const UNAUTHORIZED: u16 = 4001;

    /// A newer connection for the same seller replaced this one.
    pub const REPLACED: u16 = 4008;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_frames_use_type_tags() {
        let ping: WsClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, WsClientMessage::Ping);
        let hb: WsClientMessage = serde_json::from_str(r#"{"type":"heartbeat"}"#).unwrap();
        assert_eq!(hb, WsClientMessage::Heartbeat);
    }

    #[test]
    fn unknown_client_frame_fails_parse() {
        assert!(serde_json::from_str::<WsClientMessage>(r#"{"type":"selfie"}"#).is_err());
    }

    #[test]
    fn grouped_frame_serializes_with_tag() {
        let frame = WsServerMessage::GroupedPaymentNotification {
            count: 0,
            total_amount: rust_decimal::Decimal::ZERO,
            items: vec![],
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains(r#""type":"grouped_payment_notification""#));
    }
}
