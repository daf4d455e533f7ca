use crate::model::cart::Cart;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCartRepository = Arc<dyn CartRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait CartLockTrait {
    async fn save(self: Box<Self>, cart: &Cart) -> Result<(), RepositoryError>;
}

pub type CartLock = Box<dyn CartLockTrait + Send>;

#[async_trait]
pub trait CartRepositoryTrait {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError>;

    /// The cart stays locked until the returned lock is saved or dropped.
    async fn lock(
        &self,
        user_id: i64,
        create: bool,
    ) -> Result<Option<(Cart, CartLock)>, RepositoryError>;
}
