use serde::{Deserialize, Serialize};
use std::fmt;

pub const STOCK_UPDATE_TOPIC: &str = "product.stock.update";

pub const ORDER_CREATED_TOPIC: &str = "order.created";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockOperation {
    Reserve,
    Release,
}

impl StockOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockOperation::Reserve => "RESERVE",
            StockOperation::Release => "RELEASE",
        }
    }
}

impl fmt::Display for StockOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events without `idempotency_key` are applied on every delivery.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentEvent {
    pub product_id: i64,
    pub quantity_changed: i32,
    pub operation: StockOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
}

impl StockAdjustmentEvent {
    pub fn reserve(product_id: i64, quantity: i32) -> Self {
        Self {
            product_id,
            quantity_changed: quantity,
            operation: StockOperation::Reserve,
            idempotency_key: None,
        }
    }

    pub fn release(product_id: i64, quantity: i32) -> Self {
        Self {
            product_id,
            quantity_changed: quantity,
            operation: StockOperation::Release,
            idempotency_key: None,
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedEvent {
    pub order_id: i64,
    pub order_number: String,
    pub customer_id: i64,
}
