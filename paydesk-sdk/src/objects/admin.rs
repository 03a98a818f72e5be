//! Ops API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payment::PaymentStatus;

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Decryption outcome for audit rows.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `paydesk-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecryptionStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for DecryptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecryptionStatus::Pending => write!(f, "pending"),
            DecryptionStatus::Success => write!(f, "success"),
            DecryptionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Audit ledger row for the ops dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAuditResponse {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub device_fingerprint: String,
    pub event_timestamp: i64,
    pub dedup_hash: String,
    pub decryption_status: DecryptionStatus,
    pub decrypt_error: Option<String>,
    pub extracted_amount: Option<rust_decimal::Decimal>,
    pub extracted_sender: Option<String>,
    pub extracted_reference: Option<String>,
    pub linked_payment_id: Option<Uuid>,
    pub created_at: i64,
}

/// Live connection snapshot from the push registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsResponse {
    /// Number of sellers with an open push connection.
    pub count: usize,
    /// Their ids, in no particular order.
    pub seller_ids: Vec<Uuid>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

pub(crate) const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;
const MAX_OFFSET: i64 = 100_000;

/// Query parameters for listing payment rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPaymentsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<PaymentStatus>,
    pub seller_id: Option<Uuid>,
}

/// Query parameters for listing audit rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListAuditsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    pub status: Option<DecryptionStatus>,
    pub admin_id: Option<Uuid>,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Clamp limit and offset to safe maximums.
pub fn clamp_pagination(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.clamp(0, MAX_OFFSET))
}
