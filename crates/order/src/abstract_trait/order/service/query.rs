use crate::domain::response::order::OrderResponse;
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_all(&self) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn find_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError>;
}
