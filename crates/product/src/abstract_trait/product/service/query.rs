use async_trait::async_trait;
use shared::{
    domain::responses::{ApiResponse, ProductResponse},
    errors::ServiceError,
};
use std::sync::Arc;

pub type DynProductQueryService = Arc<dyn ProductQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductQueryServiceTrait {
    async fn find_by_id(&self, id: i64) -> Result<ApiResponse<ProductResponse>, ServiceError>;
}
