use crate::domain::response::stock::StockAdjustmentResponse;
use async_trait::async_trait;
use shared::{domain::responses::ApiResponse, errors::ServiceError};
use std::sync::Arc;

pub type DynProductCommandService = Arc<dyn ProductCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait ProductCommandServiceTrait {
    async fn reserve_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<ApiResponse<StockAdjustmentResponse>, ServiceError>;
    async fn release_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<ApiResponse<StockAdjustmentResponse>, ServiceError>;
}
