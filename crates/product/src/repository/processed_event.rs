use crate::abstract_trait::processed_event::ProcessedEventRepositoryTrait;
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::error;

#[derive(Clone)]
pub struct ProcessedEventRepository {
    db: ConnectionPool,
}

impl ProcessedEventRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProcessedEventRepositoryTrait for ProcessedEventRepository {
    async fn try_claim(&self, key: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO processed_stock_events (idempotency_key, processed_at)
            VALUES ($1, current_timestamp)
            ON CONFLICT (idempotency_key) DO NOTHING
            "#,
        )
        .bind(key)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to claim stock event {}: {:?}", key, e);
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_claim(&self, key: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM processed_stock_events WHERE idempotency_key = $1")
            .bind(key)
            .execute(&self.db)
            .await
            .map_err(RepositoryError::from)?;

        Ok(())
    }
}
