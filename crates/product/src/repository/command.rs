use crate::{
    abstract_trait::product::repository::ProductCommandRepositoryTrait,
    model::product::Product as ProductModel,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn reserve_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        // The guard and the decrement run as one statement under the row lock.
        let reserved = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity - $2,
                updated_at = current_timestamp
            WHERE product_id = $1 AND stock_quantity >= $2
            RETURNING product_id, name, price, stock_quantity, active, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(qty)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to reserve stock for product {}: {:?}", product_id, err);
            RepositoryError::from(err)
        })?;

        if let Some(product) = reserved {
            info!(
                "🔒 Reserved {} units of product {} (remaining {})",
                qty, product_id, product.stock_quantity
            );
            return Ok(Some(product));
        }

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT product_id FROM products WHERE product_id = $1")
                .bind(product_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(RepositoryError::from)?;

        match exists {
            Some(_) => {
                warn!("⚠️ Insufficient stock to reserve {} units of product {}", qty, product_id);
                Ok(None)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn release_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<ProductModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let product = sqlx::query_as::<_, ProductModel>(
            r#"
            UPDATE products
            SET stock_quantity = stock_quantity + $2,
                updated_at = current_timestamp
            WHERE product_id = $1
            RETURNING product_id, name, price, stock_quantity, active, created_at, updated_at
            "#,
        )
        .bind(product_id)
        .bind(qty)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to release stock for product {}: {:?}", product_id, err);
            RepositoryError::from(err)
        })?
        .ok_or(RepositoryError::NotFound)?;

        info!(
            "🔓 Released {} units of product {} (now {})",
            qty, product_id, product.stock_quantity
        );

        Ok(product)
    }
}
