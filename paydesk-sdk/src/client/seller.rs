//! Seller API client (seller device → Paydesk server).
//!
//! REST calls carry the seller bearer token in the `Authorization` header;
//! [`SellerClient::subscribe_push`] opens the push WebSocket with the same
//! credential.

use futures_util::{SinkExt, StreamExt};
use reqwest::Client;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::payment::{ListPendingQuery, PagedPayments, PaymentResponse, RejectRequest};
use crate::objects::ws::{WsClientMessage, WsServerMessage};

/// Typed client for the Paydesk **Seller API**.
#[derive(Debug, Clone)]
pub struct SellerClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl SellerClient {
    /// Create a new `SellerClient`.
    ///
    /// * `base_url` – root URL of the Paydesk server.
    /// * `token` – the seller bearer token (see `paydesk_sdk::token`).
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// `POST /api/v1/seller/payments/{id}/claim` – claim a pending payment.
    pub async fn claim(&self, payment_id: Uuid) -> Result<PaymentResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/seller/payments/{payment_id}/claim"))?;

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST /api/v1/seller/payments/{id}/reject` – reject a pending payment
    /// with a reason.
    pub async fn reject(
        &self,
        payment_id: Uuid,
        reason: impl Into<String>,
    ) -> Result<PaymentResponse, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/seller/payments/{payment_id}/reject"))?;

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .json(&RejectRequest {
                reason: reason.into(),
            })
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/seller/payments/pending` – list this seller's pending
    /// payment rows, oldest first, with optional date filters.
    pub async fn list_pending(
        &self,
        query: &ListPendingQuery,
    ) -> Result<PagedPayments, ClientError> {
        let url = self.base_url.join("/api/v1/seller/payments/pending")?;

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.bearer())
            .query(query)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/seller/ws` – open the push WebSocket.
    pub async fn subscribe_push(&self) -> Result<PushSubscription, ClientError> {
        let mut url = self.base_url.join("/api/v1/seller/ws")?;
        let ws_scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            _ => return Err(ClientError::UnsupportedScheme),
        };
        url.set_scheme(ws_scheme)
            .map_err(|_| ClientError::UnsupportedScheme)?;

        let mut request = url.as_str().into_client_request()?;
        request.headers_mut().insert(
            reqwest::header::AUTHORIZATION,
            self.bearer().parse().map_err(|_| ClientError::InvalidToken)?,
        );

        let (stream, _response) = connect_async(request).await?;
        Ok(PushSubscription { stream })
    }
}

/// An open push WebSocket, yielding [`WsServerMessage`] frames.
pub struct PushSubscription {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PushSubscription {
    /// Wait for the next server frame.
    ///
    /// Returns `None` once the connection is closed.  Non-text frames are
    /// skipped.
    pub async fn next(&mut self) -> Option<Result<WsServerMessage, ClientError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(&text).map_err(ClientError::Json));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(ClientError::WebSocket(e))),
            }
        }
    }

    /// Send a client frame (ping/heartbeat).
    pub async fn send(&mut self, msg: WsClientMessage) -> Result<(), ClientError> {
        let json = serde_json::to_string(&msg)?;
        self.stream.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Close the subscription cleanly.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.stream.close(None).await?;
        Ok(())
    }
}
