//! Alert payload decryption.
//!
//! Encrypted notification payloads are never decrypted in-process; they go
//! to a sidecar service holding the vendor keys.  The trait keeps the
//! transport swappable so tests can stub the sidecar out.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur while decrypting an alert payload.
#[derive(Debug, Error)]
pub enum DecryptError {
    /// Transport failure talking to the sidecar
    #[error("decrypt request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The sidecar answered but refused the payload
    #[error("payload rejected: {reason}")]
    Rejected { reason: String },

    /// The sidecar's answer could not be used
    #[error("malformed decrypt response: {0}")]
    Malformed(String),
}

/// The plaintext alert extracted from an encrypted payload.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecryptedAlert {
    /// Paid amount.
    pub amount: Decimal,
    /// Payer display name from the payment app.
    pub sender_name: String,
    /// Payer phone number, when the alert carries one.
    pub sender_phone: Option<String>,
    /// Receiving phone number, when the alert carries one.
    pub receiver_phone: Option<String>,
    /// Payment-app transaction reference.
    pub transaction_id: String,
}

/// Trait for alert decryption backends.
#[async_trait]
pub trait AlertDecryptor: Send + Sync {
    /// Decrypt one payload captured by the device named in
    /// `device_fingerprint`.
    async fn decrypt(
        &self,
        payload: &str,
        device_fingerprint: &str,
    ) -> Result<DecryptedAlert, DecryptError>;
}

/// HTTP decryptor talking to the sidecar's decrypt endpoint.
pub struct HttpAlertDecryptor {
    endpoint: Url,
    http_client: reqwest::Client,
}

impl HttpAlertDecryptor {
    /// Build a decryptor with its own connection pool and per-request
    /// timeout.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint,
            http_client,
        })
    }
}

#[async_trait]
impl AlertDecryptor for HttpAlertDecryptor {
    #[tracing::instrument(skip_all, fields(%device_fingerprint))]
    async fn decrypt(
        &self,
        payload: &str,
        device_fingerprint: &str,
    ) -> Result<DecryptedAlert, DecryptError> {
        #[derive(Debug, serde::Serialize)]
        struct DecryptRequest<'a> {
            payload: &'a str,
            device_fingerprint: &'a str,
        }

        #[derive(Debug, serde::Deserialize)]
        struct DecryptResponse {
            status: String,
            message: Option<String>,
            result: Option<DecryptedAlert>,
        }

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&DecryptRequest {
                payload,
                device_fingerprint,
            })
            .send()
            .await?;
        let response: DecryptResponse = response.json().await?;
        if response.status != "ok" {
            return Err(DecryptError::Rejected {
                reason: response
                    .message
                    .unwrap_or_else(|| "no reason given".to_string()),
            });
        }
        response
            .result
            .ok_or_else(|| DecryptError::Malformed("status ok but result missing".to_string()))
    }
}
