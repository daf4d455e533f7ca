#![allow(dead_code)]

use async_trait::async_trait;
use order::{
    abstract_trait::{
        cart::DynCartRepository,
        product_client::{DynProductClient, ProductClientTrait},
    },
    di::DependenciesInjectDeps,
    repository::{InMemoryCartRepository, InMemoryOrderRepository},
    state::AppState,
};
use shared::{
    config::InMemoryBroker,
    domain::{
        event::{STOCK_UPDATE_TOPIC, StockAdjustmentEvent},
        responses::ProductResponse,
    },
    errors::ServiceError,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

#[derive(Default)]
pub struct StubProductClient {
    products: Mutex<HashMap<i64, ProductResponse>>,
    unavailable: AtomicBool,
    calls: AtomicUsize,
}

impl StubProductClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(self: &Arc<Self>, id: i64, price: i64, stock: i32) -> Arc<Self> {
        self.put(ProductResponse {
            id,
            name: format!("Product {id}"),
            price,
            stock_quantity: stock,
            active: true,
        });
        self.clone()
    }

    pub fn put(&self, product: ProductResponse) {
        self.products.lock().unwrap().insert(product.id, product);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductClientTrait for StubProductClient {
    async fn find_by_id(&self, id: i64) -> Result<ProductResponse, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ServiceError::DependencyUnavailable(
                "product service: connection refused".into(),
            ));
        }

        self.products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Product {id} not found")))
    }
}

pub struct Harness {
    pub state: AppState,
    pub orders: InMemoryOrderRepository,
    pub carts: InMemoryCartRepository,
    pub broker: InMemoryBroker,
}

impl Harness {
    pub fn new(product_client: DynProductClient) -> Self {
        Self::with_carts(product_client, |carts| Arc::new(carts) as DynCartRepository)
    }

    pub fn with_carts(
        product_client: DynProductClient,
        wrap: impl FnOnce(InMemoryCartRepository) -> DynCartRepository,
    ) -> Self {
        let orders = InMemoryOrderRepository::new();
        let carts = InMemoryCartRepository::new();
        let broker = InMemoryBroker::new();

        let mut deps = DependenciesInjectDeps::in_memory(
            orders.clone(),
            carts.clone(),
            product_client,
            Arc::new(broker.clone()),
        );
        deps.cart_repo = wrap(carts.clone());

        let state = AppState::new(deps).expect("state");

        Self {
            state,
            orders,
            carts,
            broker,
        }
    }

    pub async fn stock_events(&self) -> Vec<StockAdjustmentEvent> {
        self.broker
            .published(STOCK_UPDATE_TOPIC)
            .await
            .iter()
            .map(|m| serde_json::from_slice(&m.payload).expect("stock event"))
            .collect()
    }
}
