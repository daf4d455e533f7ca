use serde::{Deserialize, Serialize};
use shared::domain::event::StockOperation;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StockAdjustmentResponse {
    pub product_id: i64,
    #[schema(value_type = String, example = "RESERVE")]
    pub operation: StockOperation,
    pub quantity: i32,
    pub applied: bool,
    pub stock_quantity: i32,
}
