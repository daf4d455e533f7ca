use crate::{
    abstract_trait::cart::{CartLock, CartLockTrait, CartRepositoryTrait},
    model::cart::{Cart, CartItem},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::{PgConnection, Postgres, Transaction};
use tracing::{error, info};

#[derive(Clone)]
pub struct CartRepository {
    db: ConnectionPool,
}

impl CartRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

async fn load_items(
    conn: &mut PgConnection,
    user_id: i64,
    cart_id: i64,
) -> Result<Cart, RepositoryError> {
    let items = sqlx::query_as::<_, CartItem>(
        r#"
        SELECT product_id, quantity, unit_price
        FROM cart_items
        WHERE cart_id = $1
        ORDER BY cart_item_id
        "#,
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await
    .map_err(RepositoryError::from)?;

    Cart::from_parts(user_id, items).map_err(|e| RepositoryError::Invariant(e.to_string()))
}

#[async_trait]
impl CartRepositoryTrait for CartRepository {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let cart_id: Option<i64> =
            sqlx::query_scalar("SELECT cart_id FROM carts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(|e| {
                    error!("❌ Failed to fetch cart of user {}: {:?}", user_id, e);
                    RepositoryError::from(e)
                })?;

        match cart_id {
            Some(cart_id) => Ok(Some(load_items(&mut *conn, user_id, cart_id).await?)),
            None => Ok(None),
        }
    }

    async fn lock(
        &self,
        user_id: i64,
        create: bool,
    ) -> Result<Option<(Cart, CartLock)>, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let cart_id = if create {
            sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO carts (user_id, created_at, updated_at)
                VALUES ($1, current_timestamp, current_timestamp)
                ON CONFLICT (user_id) DO UPDATE SET updated_at = current_timestamp
                RETURNING cart_id
                "#,
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
        } else {
            sqlx::query_scalar::<_, i64>("SELECT cart_id FROM carts WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
        }
        .map_err(|e| {
            error!("❌ Failed to lock cart of user {}: {:?}", user_id, e);
            RepositoryError::from(e)
        })?;

        let Some(cart_id) = cart_id else {
            return Ok(None);
        };

        let cart = load_items(&mut *tx, user_id, cart_id).await?;
        let lock: CartLock = Box::new(PgCartLock { tx, cart_id });

        Ok(Some((cart, lock)))
    }
}

struct PgCartLock {
    tx: Transaction<'static, Postgres>,
    cart_id: i64,
}

#[async_trait]
impl CartLockTrait for PgCartLock {
    async fn save(self: Box<Self>, cart: &Cart) -> Result<(), RepositoryError> {
        let PgCartLock { mut tx, cart_id } = *self;

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        for item in cart.items() {
            sqlx::query(
                r#"
                INSERT INTO cart_items (cart_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(cart_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;
        }

        sqlx::query("UPDATE carts SET updated_at = current_timestamp WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

        tx.commit().await.map_err(|e| {
            error!("❌ Failed to save cart of user {}: {:?}", cart.user_id(), e);
            RepositoryError::from(e)
        })?;

        info!(
            "🛒 Saved cart of user {} ({} lines)",
            cart.user_id(),
            cart.items().len()
        );

        Ok(())
    }
}
