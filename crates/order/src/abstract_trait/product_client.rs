use async_trait::async_trait;
use shared::{domain::responses::ProductResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynProductClient = Arc<dyn ProductClientTrait + Send + Sync>;

#[async_trait]
pub trait ProductClientTrait {
    /// `NotFound` for a missing product, `DependencyUnavailable` when unreachable.
    async fn find_by_id(&self, id: i64) -> Result<ProductResponse, ServiceError>;
}
