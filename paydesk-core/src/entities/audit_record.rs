use crate::entities::DecryptionStatus;
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use paydesk_sdk::objects::admin::AdminAuditResponse;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One row in the append-only ingest ledger.
///
/// Created as `pending` before decryption is attempted, then moved to
/// `success` or `failed` exactly once.  Rows with `success` never change
/// again apart from the `linked_payment_id` backfill.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AuditRecord {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub raw_payload: String,
    pub device_fingerprint: String,
    pub event_timestamp: i64,
    pub dedup_hash: String,
    pub decryption_status: DecryptionStatus,
    pub decrypt_error: Option<String>,
    pub extracted_amount: Option<Decimal>,
    pub extracted_sender: Option<String>,
    pub extracted_reference: Option<String>,
    pub linked_payment_id: Option<Uuid>,
    pub created_at: time::PrimitiveDateTime,
}

const AUDIT_COLUMNS: &str = "id, admin_id, raw_payload, device_fingerprint, event_timestamp, \
     dedup_hash, decryption_status, decrypt_error, extracted_amount, extracted_sender, \
     extracted_reference, linked_payment_id, created_at";

impl AuditRecord {
    /// Convert into the ops API representation (omits the raw payload).
    pub fn to_response(&self) -> AdminAuditResponse {
        AdminAuditResponse {
            id: self.id,
            admin_id: self.admin_id,
            device_fingerprint: self.device_fingerprint.clone(),
            event_timestamp: self.event_timestamp,
            dedup_hash: self.dedup_hash.clone(),
            decryption_status: self.decryption_status.into(),
            decrypt_error: self.decrypt_error.clone(),
            extracted_amount: self.extracted_amount,
            extracted_sender: self.extracted_sender.clone(),
            extracted_reference: self.extracted_reference.clone(),
            linked_payment_id: self.linked_payment_id,
            created_at: self.created_at.assume_utc().unix_timestamp(),
        }
    }
}

/// Errors from creating the ledger row.
#[derive(Debug, thiserror::Error)]
pub enum CreateAuditError {
    /// The dedup hash already exists; this event was seen before.
    #[error("duplicate event")]
    Duplicate,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

/// Insert the ledger row for a fresh event, status `pending`.
///
/// A unique-constraint hit on the dedup hash maps to
/// [`CreateAuditError::Duplicate`]; no second row is ever written for the
/// same hash.
#[derive(Debug, Clone)]
pub struct CreateAuditRecord {
    pub admin_id: Uuid,
    pub raw_payload: String,
    pub device_fingerprint: String,
    pub event_timestamp: i64,
    pub dedup_hash: String,
}

impl Processor<CreateAuditRecord> for DatabaseProcessor {
    type Output = AuditRecord;
    type Error = CreateAuditError;
    #[tracing::instrument(skip_all, err, name = "SQL:CreateAuditRecord")]
    async fn process(&self, cmd: CreateAuditRecord) -> Result<AuditRecord, CreateAuditError> {
        let result = sqlx::query_as::<_, AuditRecord>(&format!(
            "INSERT INTO audit_records \
             (id, admin_id, raw_payload, device_fingerprint, event_timestamp, dedup_hash) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {AUDIT_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(cmd.admin_id)
        .bind(cmd.raw_payload)
        .bind(cmd.device_fingerprint)
        .bind(cmd.event_timestamp)
        .bind(cmd.dedup_hash)
        .fetch_one(&self.pool)
        .await;

        result.map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CreateAuditError::Duplicate,
            _ => CreateAuditError::Database(e),
        })
    }
}

/// Record a decryption failure on the ledger row.
#[derive(Debug, Clone)]
pub struct MarkDecryptFailed {
    pub audit_id: Uuid,
    pub error: String,
}

impl Processor<MarkDecryptFailed> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkDecryptFailed")]
    async fn process(&self, cmd: MarkDecryptFailed) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE audit_records \
             SET decryption_status = 'failed', decrypt_error = $2 \
             WHERE id = $1 AND decryption_status = 'pending'",
        )
        .bind(cmd.audit_id)
        .bind(cmd.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Record a decryption success and the extracted payment fields.
#[derive(Debug, Clone)]
pub struct MarkDecryptSucceeded {
    pub audit_id: Uuid,
    pub amount: Decimal,
    pub sender_name: String,
    pub reference_code: String,
}

impl Processor<MarkDecryptSucceeded> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:MarkDecryptSucceeded")]
    async fn process(&self, cmd: MarkDecryptSucceeded) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE audit_records \
             SET decryption_status = 'success', extracted_amount = $2, \
                 extracted_sender = $3, extracted_reference = $4 \
             WHERE id = $1 AND decryption_status = 'pending'",
        )
        .bind(cmd.audit_id)
        .bind(cmd.amount)
        .bind(cmd.sender_name)
        .bind(cmd.reference_code)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Backfill the first fanned-out payment row onto the ledger entry.
#[derive(Debug, Clone, Copy)]
pub struct LinkAuditPayment {
    pub audit_id: Uuid,
    pub payment_id: Uuid,
}

impl Processor<LinkAuditPayment> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:LinkAuditPayment")]
    async fn process(&self, cmd: LinkAuditPayment) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE audit_records SET linked_payment_id = $2 WHERE id = $1")
            .bind(cmd.audit_id)
            .bind(cmd.payment_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Fetch one ledger row by id.
#[derive(Debug, Clone, Copy)]
pub struct GetAuditRecordById {
    pub audit_id: Uuid,
}

impl Processor<GetAuditRecordById> for DatabaseProcessor {
    type Output = Option<AuditRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAuditRecordById")]
    async fn process(&self, query: GetAuditRecordById) -> Result<Option<AuditRecord>, sqlx::Error> {
        sqlx::query_as::<_, AuditRecord>(&format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_records WHERE id = $1"
        ))
        .bind(query.audit_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Page through ledger rows for the ops dashboard, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListAuditRecords {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<DecryptionStatus>,
    pub admin_id: Option<Uuid>,
}

impl Processor<ListAuditRecords> for DatabaseProcessor {
    type Output = Vec<AuditRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListAuditRecords")]
    async fn process(&self, query: ListAuditRecords) -> Result<Vec<AuditRecord>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {AUDIT_COLUMNS} FROM audit_records WHERE true"
        ));
        if let Some(status) = query.status {
            builder.push(" AND decryption_status = ");
            builder.push_bind(status);
        }
        if let Some(admin_id) = query.admin_id {
            builder.push(" AND admin_id = ");
            builder.push_bind(admin_id);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        builder
            .build_query_as::<AuditRecord>()
            .fetch_all(&self.pool)
            .await
    }
}
