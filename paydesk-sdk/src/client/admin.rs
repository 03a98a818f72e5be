//! Ops API client (back-office dashboard → Paydesk server).
//!
//! All requests carry the plaintext admin secret in the
//! `Paydesk-Admin-Authorization` header.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::admin::{
    AdminAuditResponse, ConnectionsResponse, ListAuditsQuery, ListPaymentsQuery,
};
use crate::objects::payment::PaymentResponse;
use crate::signature::ADMIN_AUTH_HEADER;

/// Typed HTTP client for the Paydesk **Ops API**.
///
/// Authentication uses a plaintext secret sent in the
/// `Paydesk-Admin-Authorization` header, verified server-side against an
/// argon2-hashed value.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    admin_secret: String,
}

impl AdminClient {
    /// Create a new `AdminClient`.
    ///
    /// * `base_url` – root URL of the Paydesk server.
    /// * `admin_secret` – the plaintext ops secret.
    pub fn new(base_url: Url, admin_secret: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            admin_secret: admin_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /api/v1/admin/payments` – list payment rows with optional
    /// filters.
    pub async fn list_payments(
        &self,
        query: &ListPaymentsQuery,
    ) -> Result<Vec<PaymentResponse>, ClientError> {
        let url = self.base_url.join("/api/v1/admin/payments")?;

        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(query)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/admin/audits` – list audit ledger rows with optional
    /// filters.
    pub async fn list_audits(
        &self,
        query: &ListAuditsQuery,
    ) -> Result<Vec<AdminAuditResponse>, ClientError> {
        let url = self.base_url.join("/api/v1/admin/audits")?;

        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(query)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /api/v1/admin/connections` – snapshot of live push connections.
    pub async fn connections(&self) -> Result<ConnectionsResponse, ClientError> {
        let url = self.base_url.join("/api/v1/admin/connections")?;

        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .send()
            .await?;

        parse_response(resp).await
    }
}
