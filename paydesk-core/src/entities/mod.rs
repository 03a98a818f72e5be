pub mod admin;
pub mod audit_record;
pub mod pending_payment;
pub mod rejection_record;
pub mod seller;

use paydesk_sdk::objects::admin::DecryptionStatus as SdkDecryptionStatus;
use paydesk_sdk::objects::payment::PaymentStatus as SdkPaymentStatus;

/// Payment row status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `paydesk_sdk::objects::payment::PaymentStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "payment_status")]
pub enum PaymentStatus {
    Pending,
    Claimed,
    Rejected,
}

impl From<PaymentStatus> for SdkPaymentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Pending => SdkPaymentStatus::Pending,
            PaymentStatus::Claimed => SdkPaymentStatus::Claimed,
            PaymentStatus::Rejected => SdkPaymentStatus::Rejected,
        }
    }
}

impl From<SdkPaymentStatus> for PaymentStatus {
    fn from(value: SdkPaymentStatus) -> Self {
        match value {
            SdkPaymentStatus::Pending => PaymentStatus::Pending,
            SdkPaymentStatus::Claimed => PaymentStatus::Claimed,
            SdkPaymentStatus::Rejected => PaymentStatus::Rejected,
        }
    }
}

/// Decryption outcome for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see
/// `paydesk_sdk::objects::admin::DecryptionStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "decryption_status")]
pub enum DecryptionStatus {
    Pending,
    Success,
    Failed,
}

impl From<DecryptionStatus> for SdkDecryptionStatus {
    fn from(value: DecryptionStatus) -> Self {
        match value {
            DecryptionStatus::Pending => SdkDecryptionStatus::Pending,
            DecryptionStatus::Success => SdkDecryptionStatus::Success,
            DecryptionStatus::Failed => SdkDecryptionStatus::Failed,
        }
    }
}

impl From<SdkDecryptionStatus> for DecryptionStatus {
    fn from(value: SdkDecryptionStatus) -> Self {
        match value {
            SdkDecryptionStatus::Pending => DecryptionStatus::Pending,
            SdkDecryptionStatus::Success => DecryptionStatus::Success,
            SdkDecryptionStatus::Failed => DecryptionStatus::Failed,
        }
    }
}
