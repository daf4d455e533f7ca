use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

use super::order_item::OrderItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const TERMINAL: [OrderStatus; 2] = [OrderStatus::Completed, OrderStatus::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        Self::TERMINAL.contains(self)
    }

    pub fn can_transition_to(&self, _next: OrderStatus) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(ServiceError::validation(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: i64,
    pub order_number: String,
    pub customer_id: i64,
    pub total_amount: i64,
    pub status: String,
    pub shipping_address: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Order {
    pub fn status(&self) -> Result<OrderStatus, ServiceError> {
        self.status.parse().map_err(|_| {
            ServiceError::Internal(format!(
                "order {} has corrupt status '{}'",
                self.order_id, self.status
            ))
        })
    }
}

#[derive(Debug, Clone)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_case_insensitively() {
        assert_eq!("pending".parse::<OrderStatus>().unwrap(), OrderStatus::Pending);
        assert_eq!(" Cancelled ".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_states_allow_no_transition() {
        for from in OrderStatus::TERMINAL {
            for to in [
                OrderStatus::Pending,
                OrderStatus::Processing,
                OrderStatus::Completed,
                OrderStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn open_states_may_move_anywhere() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"PROCESSING\"");
    }
}
