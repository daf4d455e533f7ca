use crate::model::order::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
    #[validate(range(min = 1))]
    pub product_id: i64,

    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[validate(range(min = 1))]
    pub customer_id: i64,

    #[validate(length(min = 1), nested)]
    pub items: Vec<CreateOrderItemRequest>,

    #[validate(length(min = 1, max = 1000))]
    pub shipping_address: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema, Clone)]
pub struct UpdateOrderStatusRequest {
    #[validate(length(min = 1))]
    #[schema(example = "PROCESSING")]
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItemRecordRequest {
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_purchase: i64,
    pub subtotal: i64,
}

#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub order_number: String,
    pub customer_id: i64,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub shipping_address: String,
    pub items: Vec<CreateOrderItemRecordRequest>,
}
