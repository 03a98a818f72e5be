//! Notification ingest request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Signature;
use super::payment::PaymentResponse;

/// Upper bound on the encrypted payload (bytes of the JSON string field).
pub const MAX_PAYLOAD_BYTES: usize = 64 * 1024;
/// Upper bound on the dedup hash length.
pub const MAX_DEDUP_HASH_LEN: usize = 128;
/// Upper bound on the device fingerprint length.
pub const MAX_FINGERPRINT_LEN: usize = 256;

/// Request payload for submitting an encrypted payment notification.
///
/// Sent by the admin's device to the Service API with a signed body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmitNotification {
    /// The admin (business) this alert belongs to.
    pub admin_id: Uuid,
    /// The encrypted vendor payload, opaque to the server.
    pub payload: String,
    /// Fingerprint of the device that captured the alert.
    pub device_fingerprint: String,
    /// Unix timestamp of the payment event on the device.
    pub event_timestamp: i64,
    /// Client-computed digest identifying this event across retries.
    pub dedup_hash: String,
}

impl Signature for SubmitNotification {}

/// Structural validation failures for [`SubmitNotification`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("payload must not be empty")]
    EmptyPayload,
    #[error("payload exceeds {MAX_PAYLOAD_BYTES} bytes")]
    PayloadTooLarge,
    #[error("device fingerprint must not be empty")]
    EmptyFingerprint,
    #[error("device fingerprint exceeds {MAX_FINGERPRINT_LEN} characters")]
    FingerprintTooLong,
    #[error("dedup hash must not be empty")]
    EmptyDedupHash,
    #[error("dedup hash exceeds {MAX_DEDUP_HASH_LEN} characters")]
    DedupHashTooLong,
}

impl SubmitNotification {
    /// Check the structural constraints that do not require server state.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.payload.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }
        if self.payload.len() > MAX_PAYLOAD_BYTES {
            return Err(ValidationError::PayloadTooLarge);
        }
        if self.device_fingerprint.is_empty() {
            return Err(ValidationError::EmptyFingerprint);
        }
        if self.device_fingerprint.len() > MAX_FINGERPRINT_LEN {
            return Err(ValidationError::FingerprintTooLong);
        }
        if self.dedup_hash.is_empty() {
            return Err(ValidationError::EmptyDedupHash);
        }
        if self.dedup_hash.len() > MAX_DEDUP_HASH_LEN {
            return Err(ValidationError::DedupHashTooLong);
        }
        Ok(())
    }
}

/// Response returned by the notification ingest endpoint on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAck {
    /// The audit ledger entry recorded for this event.
    pub audit_id: Uuid,
    /// The first payment row created by the fan-out.
    pub payment: PaymentResponse,
    /// How many sellers received a row.
    pub sellers_notified: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SubmitNotification {
        SubmitNotification {
            admin_id: Uuid::new_v4(),
            payload: "ZW5jcnlwdGVk".into(),
            device_fingerprint: "pixel-8a:3f".into(),
            event_timestamp: 1_750_000_000,
            dedup_hash: "h1".into(),
        }
    }

    #[test]
    fn valid_notification_passes() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let mut n = sample();
        n.payload.clear();
        assert_eq!(n.validate(), Err(ValidationError::EmptyPayload));
    }

    #[test]
    fn oversized_hash_is_rejected() {
        let mut n = sample();
        n.dedup_hash = "h".repeat(MAX_DEDUP_HASH_LEN + 1);
        assert_eq!(n.validate(), Err(ValidationError::DedupHashTooLong));
    }

    #[test]
    fn empty_fingerprint_is_rejected() {
        let mut n = sample();
        n.device_fingerprint.clear();
        assert_eq!(n.validate(), Err(ValidationError::EmptyFingerprint));
    }
}
