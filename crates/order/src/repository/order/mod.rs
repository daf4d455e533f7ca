mod command;
mod query;

pub use self::command::OrderCommandRepository;
pub use self::query::OrderQueryRepository;

use crate::model::{
    order::{Order, OrderWithItems},
    order_item::OrderItem,
};
use shared::errors::RepositoryError;
use sqlx::PgConnection;
use std::collections::HashMap;

const ORDER_COLUMNS: &str = "order_id, order_number, customer_id, total_amount, status, \
                             shipping_address, created_at, updated_at";

async fn attach_items(
    conn: &mut PgConnection,
    orders: Vec<Order>,
) -> Result<Vec<OrderWithItems>, RepositoryError> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i64> = orders.iter().map(|o| o.order_id).collect();

    let items = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT order_item_id, order_id, product_id, quantity, price_at_purchase, subtotal
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY order_item_id
        "#,
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| {
            let items = by_order.remove(&order.order_id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect())
}
