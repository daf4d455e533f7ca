use crate::model::order::OrderWithItems;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_all(&self) -> Result<Vec<OrderWithItems>, RepositoryError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<OrderWithItems>, RepositoryError>;
    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderWithItems>, RepositoryError>;
    async fn find_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<OrderWithItems>, RepositoryError>;
}
