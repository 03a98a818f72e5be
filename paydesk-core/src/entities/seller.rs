use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// A staff device belonging to one admin.  Sellers receive fanned-out
/// payment rows and confirm or reject them.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Seller {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub display_name: String,
    pub active: bool,
    pub created_at: time::PrimitiveDateTime,
}

/// Fetch one seller by id.
#[derive(Debug, Clone, Copy)]
pub struct GetSellerById {
    pub seller_id: Uuid,
}

impl Processor<GetSellerById> for DatabaseProcessor {
    type Output = Option<Seller>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetSellerById")]
    async fn process(&self, query: GetSellerById) -> Result<Option<Seller>, sqlx::Error> {
        sqlx::query_as::<_, Seller>(
            "SELECT id, admin_id, display_name, active, created_at FROM sellers WHERE id = $1",
        )
        .bind(query.seller_id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Ids of one admin's active sellers, oldest first.
///
/// This is the fan-out set; the ordering makes the first created row of a
/// dispatch stable.
#[derive(Debug, Clone, Copy)]
pub struct GetActiveSellersOfAdmin {
    pub admin_id: Uuid,
}

impl Processor<GetActiveSellersOfAdmin> for DatabaseProcessor {
    type Output = Vec<Uuid>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetActiveSellersOfAdmin")]
    async fn process(&self, query: GetActiveSellersOfAdmin) -> Result<Vec<Uuid>, sqlx::Error> {
        sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM sellers WHERE admin_id = $1 AND active ORDER BY created_at, id",
        )
        .bind(query.admin_id)
        .fetch_all(&self.pool)
        .await
    }
}
