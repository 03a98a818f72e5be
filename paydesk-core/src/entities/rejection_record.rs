use crate::framework::{DatabaseAccessor, DatabaseProcessor};
use kanau::processor::Processor;
use uuid::Uuid;

/// One reject call that won the status swap on a payment row.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RejectionRecord {
    pub id: i64,
    pub payment_id: Uuid,
    pub seller_id: Uuid,
    pub reason: String,
    pub rejected_at: time::PrimitiveDateTime,
}

impl RejectionRecord {
    /// Append one record.  Generic over the accessor so the reject command
    /// can run it in the same transaction as the status swap.
    pub async fn append<A: DatabaseAccessor>(
        accessor: &mut A,
        payment_id: Uuid,
        seller_id: Uuid,
        reason: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO rejection_records (payment_id, seller_id, reason) VALUES ($1, $2, $3)",
        )
        .bind(payment_id)
        .bind(seller_id)
        .bind(reason)
        .execute(accessor.acquire())
        .await?;
        Ok(())
    }
}

/// Fetch the rejection history of one payment row, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct ListRejectionsForPayment {
    pub payment_id: Uuid,
}

impl Processor<ListRejectionsForPayment> for DatabaseProcessor {
    type Output = Vec<RejectionRecord>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:ListRejectionsForPayment")]
    async fn process(
        &self,
        query: ListRejectionsForPayment,
    ) -> Result<Vec<RejectionRecord>, sqlx::Error> {
        sqlx::query_as::<_, RejectionRecord>(
            "SELECT id, payment_id, seller_id, reason, rejected_at \
             FROM rejection_records WHERE payment_id = $1 ORDER BY id",
        )
        .bind(query.payment_id)
        .fetch_all(&self.pool)
        .await
    }
}
