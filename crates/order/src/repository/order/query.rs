use super::{ORDER_COLUMNS, attach_items};
use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    model::order::{Order, OrderWithItems},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn fetch_many(
        &self,
        filter: &str,
        bind: Option<i64>,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders {filter} ORDER BY order_id");
        let mut query = sqlx::query_as::<_, Order>(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }

        let orders = query.fetch_all(&mut *conn).await.map_err(|e| {
            error!("❌ Failed to fetch orders: {:?}", e);
            RepositoryError::from(e)
        })?;

        attach_items(&mut conn, orders).await
    }

    async fn fetch_one<T>(
        &self,
        filter: &str,
        value: T,
    ) -> Result<Option<OrderWithItems>, RepositoryError>
    where
        T: for<'q> sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Send + 'static,
    {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders {filter}");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(value)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order: {:?}", e);
                RepositoryError::from(e)
            })?;

        match order {
            Some(order) => Ok(attach_items(&mut conn, vec![order]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_all(&self) -> Result<Vec<OrderWithItems>, RepositoryError> {
        info!("📋 Fetching all orders");
        self.fetch_many("", None).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<OrderWithItems>, RepositoryError> {
        info!("🆔 Fetching order by ID: {}", id);
        self.fetch_one("WHERE order_id = $1", id).await
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        info!("🔢 Fetching order by number: {}", order_number);
        self.fetch_one("WHERE order_number = $1", order_number.to_string())
            .await
    }

    async fn find_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        info!("👤 Fetching orders for customer: {}", customer_id);
        self.fetch_many("WHERE customer_id = $1", Some(customer_id))
            .await
    }
}
