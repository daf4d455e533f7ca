use crate::domain::{
    requests::cart::{AddCartItemRequest, CheckoutRequest, UpdateCartItemRequest},
    response::{cart::CartResponse, order::OrderResponse},
};
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynCartService = Arc<dyn CartServiceTrait + Send + Sync>;

#[async_trait]
pub trait CartServiceTrait {
    async fn get_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn add_item(
        &self,
        user_id: i64,
        req: &AddCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn update_item(
        &self,
        user_id: i64,
        req: &UpdateCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn remove_item(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn clear_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn checkout(
        &self,
        user_id: i64,
        req: &CheckoutRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
