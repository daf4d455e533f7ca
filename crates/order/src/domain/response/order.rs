use crate::model::{
    order::{OrderStatus, OrderWithItems},
    order_item::OrderItem,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price_at_purchase: i64,
    pub subtotal: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub items: Vec<OrderItemResponse>,
    pub total_amount: i64,
    #[schema(value_type = OrderStatus)]
    pub status: String,
    pub shipping_address: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(value: OrderItem) -> Self {
        OrderItemResponse {
            id: value.order_item_id,
            product_id: value.product_id,
            quantity: value.quantity,
            price_at_purchase: value.price_at_purchase,
            subtotal: value.subtotal,
        }
    }
}

// model to response
impl From<OrderWithItems> for OrderResponse {
    fn from(value: OrderWithItems) -> Self {
        let OrderWithItems { order, items } = value;

        OrderResponse {
            id: order.order_id,
            order_number: order.order_number,
            customer_id: order.customer_id,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            total_amount: order.total_amount,
            status: order.status,
            shipping_address: order.shipping_address,
            created_at: order.created_at.map(|dt| dt.to_string()),
            updated_at: order.updated_at.map(|dt| dt.to_string()),
        }
    }
}
