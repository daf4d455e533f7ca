use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProcessedEventRepository = Arc<dyn ProcessedEventRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ProcessedEventRepositoryTrait {
    /// Returns `false` when `key` was already claimed.
    async fn try_claim(&self, key: &str) -> Result<bool, RepositoryError>;

    async fn release_claim(&self, key: &str) -> Result<(), RepositoryError>;
}
