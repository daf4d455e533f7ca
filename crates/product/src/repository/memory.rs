use crate::{
    abstract_trait::{
        processed_event::ProcessedEventRepositoryTrait,
        product::repository::{ProductCommandRepositoryTrait, ProductQueryRepositoryTrait},
    },
    model::product::Product as ProductModel,
};
use async_trait::async_trait;
use chrono::Utc;
use shared::errors::RepositoryError;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::{Mutex, RwLock};

#[derive(Clone, Default)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<i64, Arc<Mutex<ProductModel>>>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product: ProductModel) {
        self.products
            .write()
            .await
            .insert(product.product_id, Arc::new(Mutex::new(product)));
    }

    async fn slot(&self, product_id: i64) -> Result<Arc<Mutex<ProductModel>>, RepositoryError> {
        self.products
            .read()
            .await
            .get(&product_id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for InMemoryProductRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ProductModel>, RepositoryError> {
        match self.slot(id).await {
            Ok(slot) => Ok(Some(slot.lock().await.clone())),
            Err(RepositoryError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for InMemoryProductRepository {
    async fn reserve_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<Option<ProductModel>, RepositoryError> {
        let slot = self.slot(product_id).await?;
        let mut product = slot.lock().await;

        if product.stock_quantity < qty {
            return Ok(None);
        }

        product.stock_quantity -= qty;
        product.updated_at = Some(Utc::now().naive_utc());

        Ok(Some(product.clone()))
    }

    async fn release_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<ProductModel, RepositoryError> {
        let slot = self.slot(product_id).await?;
        let mut product = slot.lock().await;

        product.stock_quantity = product
            .stock_quantity
            .checked_add(qty)
            .ok_or_else(|| RepositoryError::Invariant("stock quantity overflow".into()))?;
        product.updated_at = Some(Utc::now().naive_utc());

        Ok(product.clone())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryProcessedEventRepository {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryProcessedEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedEventRepositoryTrait for InMemoryProcessedEventRepository {
    async fn try_claim(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.keys.lock().await.insert(key.to_string()))
    }

    async fn release_claim(&self, key: &str) -> Result<(), RepositoryError> {
        self.keys.lock().await.remove(key);
        Ok(())
    }
}
