use crate::entities::PaymentStatus;
use crate::entities::rejection_record::RejectionRecord;
use crate::framework::{DatabaseAccessor, DatabaseProcessor, TransactionProcessor};
use kanau::processor::Processor;
use paydesk_sdk::objects::payment::PaymentResponse;
use rust_decimal::Decimal;
use uuid::Uuid;

/// One dispatched payment alert, owned by exactly one seller.
///
/// Rows are never deleted; claim and reject move them to a terminal status
/// exactly once.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PendingPayment {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub seller_id: Uuid,
    pub amount: Decimal,
    pub sender_name: String,
    pub reference_code: String,
    pub status: PaymentStatus,
    pub claimed_by: Option<Uuid>,
    pub rejected_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub confirmed_at: Option<time::PrimitiveDateTime>,
    pub rejected_at: Option<time::PrimitiveDateTime>,
}

const RETURNING_COLUMNS: &str = "id, admin_id, seller_id, amount, sender_name, reference_code, \
     status, claimed_by, rejected_by, rejection_reason, created_at, confirmed_at, rejected_at";

impl PendingPayment {
    /// Convert into the API/DTO representation.
    pub fn to_response(&self) -> PaymentResponse {
        PaymentResponse {
            payment_id: self.id,
            admin_id: self.admin_id,
            seller_id: self.seller_id,
            amount: self.amount,
            sender_name: self.sender_name.clone(),
            reference_code: self.reference_code.clone(),
            status: self.status.into(),
            claimed_by: self.claimed_by,
            rejected_by: self.rejected_by,
            rejection_reason: self.rejection_reason.clone(),
            created_at: self.created_at.assume_utc().unix_timestamp(),
            confirmed_at: self.confirmed_at.map(|t| t.assume_utc().unix_timestamp()),
            rejected_at: self.rejected_at.map(|t| t.assume_utc().unix_timestamp()),
        }
    }

    /// Compare-and-swap a pending row to `rejected`.  Generic over the
    /// accessor so the reject command can run it inside its transaction.
    /// Returns `None` when the row was not in `pending` (someone else
    /// already won the transition) or does not exist.
    pub async fn reject_cas<A: DatabaseAccessor>(
        accessor: &mut A,
        payment_id: Uuid,
        seller_id: Uuid,
        reason: &str,
    ) -> Result<Option<PendingPayment>, sqlx::Error> {
        sqlx::query_as::<_, PendingPayment>(&format!(
            "UPDATE pending_payments \
             SET status = 'rejected', rejected_by = $2, rejection_reason = $3, \
                 rejected_at = timezone('utc', now()) \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {RETURNING_COLUMNS}"
        ))
        .bind(payment_id)
        .bind(seller_id)
        .bind(reason)
        .fetch_optional(accessor.acquire())
        .await
    }
}

/// Why a claim or reject did not go through.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("payment not found")]
    NotFound,
    #[error("payment is not pending (current status: {current})")]
    InvalidState {
        current: paydesk_sdk::objects::payment::PaymentStatus,
    },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Insert one freshly dispatched row with status `pending`.
#[derive(Debug, Clone)]
pub struct CreatePendingPayment {
    pub admin_id: Uuid,
    pub seller_id: Uuid,
    pub amount: Decimal,
    pub sender_name: String,
    pub reference_code: String,
}

impl Processor<CreatePendingPayment> for DatabaseProcessor {
    type Output = PendingPayment;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CreatePendingPayment")]
    async fn process(&self, cmd: CreatePendingPayment) -> Result<PendingPayment, sqlx::Error> {
        sqlx::query_as::<_, PendingPayment>(&format!(
            "INSERT INTO pending_payments \
             (id, admin_id, seller_id, amount, sender_name, reference_code) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RETURNING_COLUMNS}"
        ))
        .bind(Uuid::now_v7())
        .bind(cmd.admin_id)
        .bind(cmd.seller_id)
        .bind(cmd.amount)
        .bind(cmd.sender_name)
        .bind(cmd.reference_code)
        .fetch_one(&self.pool)
        .await
    }
}

/// Fetch one row by id.
#[derive(Debug, Clone, Copy)]
pub struct GetPendingPaymentById {
    pub payment_id: Uuid,
}

impl Processor<GetPendingPaymentById> for DatabaseProcessor {
    type Output = Option<PendingPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetPendingPaymentById")]
    async fn process(
        &self,
        query: GetPendingPaymentById,
    ) -> Result<Option<PendingPayment>, sqlx::Error> {
        sqlx::query_as::<_, PendingPayment>(&format!(
            "SELECT {RETURNING_COLUMNS} FROM pending_payments WHERE id = $1"
        ))
        .bind(query.payment_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Claim a pending row for a seller.
///
/// The transition is a single conditional UPDATE keyed on `status =
/// 'pending'`, so under concurrent claims exactly one caller gets the row
/// back and everyone else sees the loser path.  Zero updated rows are
/// re-fetched once to tell "gone" from "already terminal".
#[derive(Debug, Clone, Copy)]
pub struct ClaimPendingPayment {
    pub payment_id: Uuid,
    pub seller_id: Uuid,
}

impl Processor<ClaimPendingPayment> for DatabaseProcessor {
    type Output = PendingPayment;
    type Error = TransitionError;
    #[tracing::instrument(skip_all, err, name = "SQL:ClaimPendingPayment")]
    async fn process(&self, cmd: ClaimPendingPayment) -> Result<PendingPayment, TransitionError> {
        let updated = sqlx::query_as::<_, PendingPayment>(&format!(
            "UPDATE pending_payments \
             SET status = 'claimed', claimed_by = $2, \
                 confirmed_at = timezone('utc', now()) \
             WHERE id = $1 AND status = 'pending' \
             RETURNING {RETURNING_COLUMNS}"
        ))
        .bind(cmd.payment_id)
        .bind(cmd.seller_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(row) => Ok(row),
            None => Err(lost_transition(self, cmd.payment_id).await?),
        }
    }
}

/// Reject a pending row with an operator reason.
///
/// Same compare-and-swap shape as the claim, wrapped in a transaction that
/// also appends the rejection record so the two writes land together.
#[derive(Debug, Clone)]
pub struct RejectPendingPayment {
    pub payment_id: Uuid,
    pub seller_id: Uuid,
    pub reason: String,
}

impl Processor<RejectPendingPayment> for DatabaseProcessor {
    type Output = PendingPayment;
    type Error = TransitionError;
    #[tracing::instrument(skip_all, err, name = "SQL:RejectPendingPayment")]
    async fn process(&self, cmd: RejectPendingPayment) -> Result<PendingPayment, TransitionError> {
        let tx = self.pool.begin().await?;
        let mut tp = TransactionProcessor { tx };

        let updated =
            PendingPayment::reject_cas(&mut tp, cmd.payment_id, cmd.seller_id, &cmd.reason).await?;

        let Some(row) = updated else {
            tp.tx.rollback().await?;
            return Err(lost_transition(self, cmd.payment_id).await?);
        };

        RejectionRecord::append(&mut tp, cmd.payment_id, cmd.seller_id, &cmd.reason).await?;

        tp.tx.commit().await?;
        Ok(row)
    }
}

/// Re-fetch after a failed compare-and-swap to produce the precise error.
async fn lost_transition(
    processor: &DatabaseProcessor,
    payment_id: Uuid,
) -> Result<TransitionError, sqlx::Error> {
    let current = processor
        .process(GetPendingPaymentById { payment_id })
        .await?;
    Ok(match current {
        None => TransitionError::NotFound,
        Some(row) => TransitionError::InvalidState {
            current: row.status.into(),
        },
    })
}

/// Page through one seller's pending rows, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct ListPendingForSeller {
    pub seller_id: Uuid,
    pub limit: i64,
    pub offset: i64,
    /// Only rows created at or after this unix timestamp.
    pub from: Option<i64>,
    /// Only rows created before this unix timestamp.
    pub to: Option<i64>,
}

impl Processor<ListPendingForSeller> for DatabaseProcessor {
    type Output = Vec<PendingPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListPendingForSeller")]
    async fn process(
        &self,
        query: ListPendingForSeller,
    ) -> Result<Vec<PendingPayment>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {RETURNING_COLUMNS} FROM pending_payments \
             WHERE status = 'pending' AND seller_id = "
        ));
        builder.push_bind(query.seller_id);
        if let Some(from) = query.from {
            builder.push(" AND created_at >= timezone('utc', to_timestamp(");
            builder.push_bind(from);
            builder.push("))");
        }
        if let Some(to) = query.to {
            builder.push(" AND created_at < timezone('utc', to_timestamp(");
            builder.push_bind(to);
            builder.push("))");
        }
        builder.push(" ORDER BY created_at ASC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        builder
            .build_query_as::<PendingPayment>()
            .fetch_all(&self.pool)
            .await
    }
}

/// Count one seller's pending rows under the same filters as the listing.
#[derive(Debug, Clone, Copy)]
pub struct CountPendingForSeller {
    pub seller_id: Uuid,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl Processor<CountPendingForSeller> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:CountPendingForSeller")]
    async fn process(&self, query: CountPendingForSeller) -> Result<i64, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::new(
            "SELECT count(*) FROM pending_payments WHERE status = 'pending' AND seller_id = ",
        );
        builder.push_bind(query.seller_id);
        if let Some(from) = query.from {
            builder.push(" AND created_at >= timezone('utc', to_timestamp(");
            builder.push_bind(from);
            builder.push("))");
        }
        if let Some(to) = query.to {
            builder.push(" AND created_at < timezone('utc', to_timestamp(");
            builder.push_bind(to);
            builder.push("))");
        }

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
    }
}

/// Page through payment rows for the ops dashboard, newest first.
#[derive(Debug, Clone, Copy)]
pub struct ListPayments {
    pub limit: i64,
    pub offset: i64,
    pub status: Option<PaymentStatus>,
    pub seller_id: Option<Uuid>,
}

impl Processor<ListPayments> for DatabaseProcessor {
    type Output = Vec<PendingPayment>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListPayments")]
    async fn process(&self, query: ListPayments) -> Result<Vec<PendingPayment>, sqlx::Error> {
        let mut builder = sqlx::QueryBuilder::new(format!(
            "SELECT {RETURNING_COLUMNS} FROM pending_payments WHERE true"
        ));
        if let Some(status) = query.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(seller_id) = query.seller_id {
            builder.push(" AND seller_id = ");
            builder.push_bind(seller_id);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        builder
            .build_query_as::<PendingPayment>()
            .fetch_all(&self.pool)
            .await
    }
}
