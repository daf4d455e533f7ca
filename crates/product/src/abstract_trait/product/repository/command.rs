use crate::model::product::Product as ProductModel;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynProductCommandRepository = Arc<dyn ProductCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ProductCommandRepositoryTrait {
    /// Returns `Ok(None)` without touching the row when stock is insufficient.
    async fn reserve_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<Option<ProductModel>, RepositoryError>;

    async fn release_stock(&self, product_id: i64, qty: i32)
    -> Result<ProductModel, RepositoryError>;
}
