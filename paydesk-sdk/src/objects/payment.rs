//! Payment row types for the seller API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payment status for API responses.
///
/// This is the API/DTO version without sqlx::Type.
/// For database operations, use the version in `paydesk-core::entities`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Claimed,
    Rejected,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Claimed => write!(f, "claimed"),
            PaymentStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Full payment row as returned by the claim, reject, and list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// Internal payment ID (UUID).
    pub payment_id: Uuid,
    /// The admin (business) the alert belongs to.
    pub admin_id: Uuid,
    /// The seller this row was fanned out to.
    pub seller_id: Uuid,
    /// Payment amount extracted from the alert.
    pub amount: rust_decimal::Decimal,
    /// Payer name extracted from the alert.
    pub sender_name: String,
    /// Transaction reference extracted from the alert.
    pub reference_code: String,
    /// Current row status.
    pub status: PaymentStatus,
    /// Seller that claimed the row, if any.
    pub claimed_by: Option<Uuid>,
    /// Seller that rejected the row, if any.
    pub rejected_by: Option<Uuid>,
    /// Operator-supplied reason, set on reject.
    pub rejection_reason: Option<String>,
    /// Unix timestamp of row creation.
    pub created_at: i64,
    /// Unix timestamp of the claim, if claimed.
    pub confirmed_at: Option<i64>,
    /// Unix timestamp of the reject, if rejected.
    pub rejected_at: Option<i64>,
}

/// Request body for rejecting a payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectRequest {
    /// Why the operator declined the alert. Must be non-empty.
    pub reason: String,
}

/// One page of a seller's pending payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedPayments {
    pub items: Vec<PaymentResponse>,
    /// Total rows matching the filter, ignoring pagination.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Query parameters for listing a seller's pending payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPendingQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Only rows created at or after this unix timestamp.
    pub from: Option<i64>,
    /// Only rows created before this unix timestamp.
    pub to: Option<i64>,
}

impl Default for ListPendingQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
            from: None,
            to: None,
        }
    }
}

fn default_limit() -> i64 {
    super::admin::DEFAULT_LIMIT
}
