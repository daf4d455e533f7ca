use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartItemResponse {
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub user_id: i64,
    pub items: Vec<CartItemResponse>,
    pub total: i64,
    pub item_count: i64,
}
