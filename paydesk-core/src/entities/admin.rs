use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use uuid::Uuid;

/// A payment-receiving business (one mobile device, one signing secret).
///
/// Rows are managed out of band; the service only reads them.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    /// Shared secret the admin's device signs ingest requests with.
    pub device_secret: String,
    pub active: bool,
    pub created_at: time::PrimitiveDateTime,
}

/// Fetch one admin by id.
#[derive(Debug, Clone, Copy)]
pub struct GetAdminById {
    pub admin_id: Uuid,
}

impl Processor<GetAdminById> for DatabaseProcessor {
    type Output = Option<Admin>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetAdminById")]
    async fn process(&self, query: GetAdminById) -> Result<Option<Admin>, sqlx::Error> {
        sqlx::query_as::<_, Admin>(
            "SELECT id, name, device_secret, active, created_at FROM admins WHERE id = $1",
        )
        .bind(query.admin_id)
        .fetch_optional(&self.pool)
        .await
    }
}
