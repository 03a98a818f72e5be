use sqlx::PgPool;

/// Anything that can hand out a Postgres executor: the shared pool or an
/// open transaction.  Entity helpers that must run in both contexts are
/// generic over this trait.
pub trait DatabaseAccessor {
    fn acquire(&mut self) -> impl sqlx::PgExecutor<'_>;
}

/// Pool-backed processor. All `kanau::processor::Processor` impls for the
/// payment, audit, and directory commands live on this type.
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

/// Transaction-backed accessor for command sequences that must commit or
/// roll back together (reject writes the payment row and the rejection
/// record in one transaction).
pub struct TransactionProcessor<'b> {
    pub tx: sqlx::Transaction<'b, sqlx::Postgres>,
}

impl DatabaseAccessor for DatabaseProcessor {
    fn acquire(&mut self) -> impl sqlx::PgExecutor<'_> {
        &self.pool
    }
}

impl<'b> DatabaseAccessor for TransactionProcessor<'b> {
    fn acquire(&mut self) -> impl sqlx::PgExecutor<'_> {
        &mut *self.tx
    }
}
