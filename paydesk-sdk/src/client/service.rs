//! Service API client (admin device → Paydesk server).
//!
//! All requests use body-signed HMAC-SHA256 authentication via
//! [`SignedObject`].

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::submit::{NotificationAck, SubmitNotification};
use crate::signature::{SIGNATURE_HEADER, SignedObject};

/// Typed HTTP client for the Paydesk **Service API**.
///
/// The service API is called by the admin's capture device to submit
/// encrypted payment alerts.  Every request body is signed with
/// `HMAC-SHA256("{timestamp}.{json}", device_secret)`.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl ServiceClient {
    /// Create a new `ServiceClient`.
    ///
    /// * `base_url` – root URL of the Paydesk server (e.g. `https://pay.example.com`).
    /// * `device_secret` – the shared HMAC secret for body signing.
    pub fn new(base_url: Url, device_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            secret: device_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /api/v1/service/notifications` – submit an encrypted payment
    /// alert for dispatch.
    pub async fn submit_notification(
        &self,
        payload: SubmitNotification,
    ) -> Result<NotificationAck, ClientError> {
        let signed = SignedObject::new(payload, &self.secret).map_err(ClientError::Json)?;

        let url = self.base_url.join("/api/v1/service/notifications")?;

        let resp = self
            .http
            .post(url)
            .header(SIGNATURE_HEADER, signed.to_header())
            .body(signed.json)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        parse_response(resp).await
    }
}
