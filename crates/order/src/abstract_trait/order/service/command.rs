use crate::domain::{
    requests::order::{CreateOrderRequest, UpdateOrderStatusRequest},
    response::order::OrderResponse,
};
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn cancel_order(&self, id: i64) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn update_order_status(
        &self,
        id: i64,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
