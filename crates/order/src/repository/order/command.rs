use super::{ORDER_COLUMNS, attach_items};
use crate::{
    abstract_trait::order::repository::OrderCommandRepositoryTrait,
    domain::requests::order::CreateOrderRecordRequest,
    model::{
        order::{Order, OrderStatus, OrderWithItems},
        order_item::OrderItem,
    },
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

#[derive(Clone)]
pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin transaction: {:?}", e);
            RepositoryError::from(e)
        })?;

        let sql = format!(
            r#"
            INSERT INTO orders (order_number, customer_id, total_amount, status, shipping_address,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, current_timestamp, current_timestamp)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(&req.order_number)
            .bind(req.customer_id)
            .bind(req.total_amount)
            .bind(req.status.as_str())
            .bind(&req.shipping_address)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert order {}: {:?}", req.order_number, e);
                RepositoryError::from(e)
            })?;

        let mut items = Vec::with_capacity(req.items.len());
        for item in &req.items {
            let created = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price_at_purchase, subtotal)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING order_item_id, order_id, product_id, quantity, price_at_purchase, subtotal
                "#,
            )
            .bind(order.order_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.price_at_purchase)
            .bind(item.subtotal)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert item of order {}: {:?}", req.order_number, e);
                RepositoryError::from(e)
            })?;

            items.push(created);
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        info!(
            "✅ Order {} persisted with {} items",
            order.order_number,
            items.len()
        );

        Ok(OrderWithItems { order, items })
    }

    async fn transition_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE orders
            SET status = $2, updated_at = current_timestamp
            WHERE order_id = $1 AND status NOT IN ($3, $4)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .bind(status.as_str())
            .bind(OrderStatus::Completed.as_str())
            .bind(OrderStatus::Cancelled.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update status of order {}: {:?}", order_id, e);
                RepositoryError::from(e)
            })?;

        match updated {
            Some(order) => Ok(attach_items(&mut conn, vec![order]).await?.pop()),
            None => {
                let exists: Option<i64> =
                    sqlx::query_scalar("SELECT order_id FROM orders WHERE order_id = $1")
                        .bind(order_id)
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(RepositoryError::from)?;

                match exists {
                    Some(_) => Ok(None),
                    None => Err(RepositoryError::NotFound),
                }
            }
        }
    }
}
