mod common;

use async_trait::async_trait;
use common::{Harness, StubProductClient};
use order::{
    abstract_trait::cart::{CartLock, CartLockTrait, CartRepositoryTrait, DynCartRepository},
    domain::requests::cart::{AddCartItemRequest, CheckoutRequest, UpdateCartItemRequest},
    model::cart::Cart,
    repository::InMemoryCartRepository,
};
use shared::{
    domain::{event::StockOperation, responses::ProductResponse},
    errors::{RepositoryError, ServiceError},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

// Stalls while holding the lock.
struct SlowCarts(InMemoryCartRepository);

#[async_trait]
impl CartRepositoryTrait for SlowCarts {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        self.0.find_by_user(user_id).await
    }

    async fn lock(
        &self,
        user_id: i64,
        create: bool,
    ) -> Result<Option<(Cart, CartLock)>, RepositoryError> {
        let locked = self.0.lock(user_id, create).await?;
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(locked)
    }
}

struct FlakyCarts {
    inner: InMemoryCartRepository,
    failing: Arc<AtomicBool>,
}

struct FlakyLock {
    inner: CartLock,
    failing: Arc<AtomicBool>,
}

#[async_trait]
impl CartLockTrait for FlakyLock {
    async fn save(self: Box<Self>, cart: &Cart) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Conflict("cart store offline".into()));
        }
        self.inner.save(cart).await
    }
}

#[async_trait]
impl CartRepositoryTrait for FlakyCarts {
    async fn find_by_user(&self, user_id: i64) -> Result<Option<Cart>, RepositoryError> {
        self.inner.find_by_user(user_id).await
    }

    async fn lock(
        &self,
        user_id: i64,
        create: bool,
    ) -> Result<Option<(Cart, CartLock)>, RepositoryError> {
        let Some((cart, inner)) = self.inner.lock(user_id, create).await? else {
            return Ok(None);
        };
        let lock: CartLock = Box::new(FlakyLock {
            inner,
            failing: self.failing.clone(),
        });
        Ok(Some((cart, lock)))
    }
}

fn add(product_id: i64, quantity: i32) -> AddCartItemRequest {
    AddCartItemRequest {
        product_id,
        quantity,
    }
}

fn update(product_id: i64, quantity: i32) -> UpdateCartItemRequest {
    UpdateCartItemRequest {
        product_id,
        quantity,
    }
}

fn checkout() -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: "Jl. Asia Afrika 8, Bandung".into(),
    }
}

#[tokio::test]
async fn first_access_creates_an_empty_cart() {
    let h = Harness::new(StubProductClient::new());

    let cart = h.state.di_container.cart_service.get_cart(5).await.unwrap().data;

    assert_eq!(cart.user_id, 5);
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
    assert_eq!(cart.item_count, 0);
}

#[tokio::test]
async fn totals_follow_every_mutation() {
    let products = StubProductClient::new().with(10, 1_500, 20).with(20, 250, 20);
    let h = Harness::new(products);
    let carts = &h.state.di_container.cart_service;

    carts.add_item(5, &add(10, 2)).await.unwrap();
    carts.add_item(5, &add(20, 4)).await.unwrap();
    let cart = carts.add_item(5, &add(10, 1)).await.unwrap().data;

    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].product_name.as_deref(), Some("Product 10"));
    assert_eq!(cart.total, 3 * 1_500 + 4 * 250);
    assert_eq!(cart.item_count, 7);

    let cart = carts.update_item(5, &update(20, 1)).await.unwrap().data;
    assert_eq!(cart.total, 3 * 1_500 + 250);
    assert_eq!(cart.item_count, 4);

    let cart = carts.update_item(5, &update(20, 0)).await.unwrap().data;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total, 4_500);
    assert_eq!(cart.item_count, 3);

    let cart = carts.remove_item(5, 10).await.unwrap().data;
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
    assert_eq!(cart.item_count, 0);
}

#[tokio::test]
async fn captured_price_survives_catalogue_changes() {
    let products = StubProductClient::new().with(10, 1_500, 20);
    let h = Harness::new(products.clone());
    let carts = &h.state.di_container.cart_service;

    carts.add_item(5, &add(10, 1)).await.unwrap();

    products.put(ProductResponse {
        id: 10,
        name: "Product 10".into(),
        price: 2_000,
        stock_quantity: 20,
        active: true,
    });

    let cart = carts.add_item(5, &add(10, 1)).await.unwrap().data;
    assert_eq!(cart.items[0].unit_price, 1_500);
    assert_eq!(cart.total, 3_000);
}

#[tokio::test]
async fn lines_render_without_name_when_lookup_fails() {
    let products = StubProductClient::new().with(10, 1_500, 20);
    let h = Harness::new(products.clone());
    let carts = &h.state.di_container.cart_service;

    carts.add_item(5, &add(10, 2)).await.unwrap();
    products.set_unavailable(true);

    let cart = carts.get_cart(5).await.unwrap().data;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_name, None);
    assert_eq!(cart.items[0].unit_price, 1_500);
    assert_eq!(cart.total, 3_000);
}

#[tokio::test]
async fn unusable_products_are_not_added() {
    let products = StubProductClient::new();
    products.put(ProductResponse {
        id: 30,
        name: "Discontinued".into(),
        price: 100,
        stock_quantity: 5,
        active: false,
    });
    let h = Harness::new(products);
    let carts = &h.state.di_container.cart_service;

    let err = carts.add_item(5, &add(30, 1)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = carts.add_item(5, &add(99, 1)).await.unwrap_err();
    assert!(err.is_not_found());

    let err = carts.add_item(5, &add(30, 0)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn mutating_a_missing_cart_is_not_found() {
    let products = StubProductClient::new().with(10, 1_500, 20);
    let h = Harness::new(products);
    let carts = &h.state.di_container.cart_service;

    assert!(carts.update_item(5, &update(10, 1)).await.unwrap_err().is_not_found());
    assert!(carts.remove_item(5, 10).await.unwrap_err().is_not_found());
    assert!(carts.clear_cart(5).await.unwrap_err().is_not_found());

    carts.add_item(5, &add(10, 1)).await.unwrap();
    assert!(carts.update_item(5, &update(20, 1)).await.unwrap_err().is_not_found());
    assert!(carts.remove_item(5, 20).await.unwrap_err().is_not_found());

    let cart = carts.clear_cart(5).await.unwrap().data;
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
}

#[tokio::test]
async fn checkout_turns_cart_into_order_and_empties_it() {
    let products = StubProductClient::new().with(10, 1_500, 20).with(20, 250, 20);
    let h = Harness::new(products);
    let carts = &h.state.di_container.cart_service;

    carts.add_item(5, &add(10, 2)).await.unwrap();
    carts.add_item(5, &add(20, 1)).await.unwrap();

    let order = carts.checkout(5, &checkout()).await.unwrap().data;
    assert_eq!(order.customer_id, 5);
    assert_eq!(order.status, "PENDING");
    assert_eq!(order.total_amount, 3_250);
    assert_eq!(order.items.len(), 2);

    let reservations = h
        .stock_events()
        .await
        .iter()
        .filter(|e| e.operation == StockOperation::Reserve)
        .count();
    assert_eq!(reservations, 2);

    let cart = carts.get_cart(5).await.unwrap().data;
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn failed_checkout_keeps_the_cart() {
    let products = StubProductClient::new().with(10, 1_500, 20);
    let h = Harness::new(products.clone());
    let carts = &h.state.di_container.cart_service;

    let err = carts.checkout(5, &checkout()).await.unwrap_err();
    assert!(err.is_not_found());

    carts.get_cart(5).await.unwrap();
    let err = carts.checkout(5, &checkout()).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    carts.add_item(5, &add(10, 3)).await.unwrap();
    products.put(ProductResponse {
        id: 10,
        name: "Product 10".into(),
        price: 1_500,
        stock_quantity: 1,
        active: true,
    });

    let err = carts.checkout(5, &checkout()).await.unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { .. }));

    let cart = carts.get_cart(5).await.unwrap().data;
    assert_eq!(cart.item_count, 3);
    assert_eq!(h.orders.count().await, 0);
    assert_eq!(h.broker.published_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_are_all_kept() {
    let products = StubProductClient::new().with(10, 100, 50);
    let h = Harness::with_carts(products, |carts| {
        Arc::new(SlowCarts(carts)) as DynCartRepository
    });
    let service = h.state.di_container.cart_service.clone();

    let adds: Vec<_> = (0..10)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.add_item(5, &add(10, 1)).await })
        })
        .collect();

    for handle in adds {
        handle.await.unwrap().unwrap();
    }

    let cart = service.get_cart(5).await.unwrap().data;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.item_count, 10);
    assert_eq!(cart.total, 1_000);
}

#[tokio::test]
async fn overflowing_quantity_is_rejected() {
    let products = StubProductClient::new().with(10, 1, 20);
    let h = Harness::new(products);
    let carts = &h.state.di_container.cart_service;

    carts.add_item(5, &add(10, i32::MAX)).await.unwrap();

    let err = carts.add_item(5, &add(10, 5)).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let cart = carts.get_cart(5).await.unwrap().data;
    assert_eq!(cart.item_count, i32::MAX as i64);
    assert_eq!(cart.total, i32::MAX as i64);
}

#[tokio::test]
async fn checkout_returns_the_order_when_clearing_the_cart_fails() {
    let products = StubProductClient::new().with(10, 1_500, 20);
    let failing = Arc::new(AtomicBool::new(false));
    let flag = failing.clone();
    let h = Harness::with_carts(products, move |inner| {
        Arc::new(FlakyCarts {
            inner,
            failing: flag,
        }) as DynCartRepository
    });
    let carts = &h.state.di_container.cart_service;

    carts.add_item(5, &add(10, 2)).await.unwrap();
    failing.store(true, Ordering::SeqCst);

    let order = carts.checkout(5, &checkout()).await.unwrap().data;
    assert_eq!(order.total_amount, 3_000);
    assert_eq!(h.orders.count().await, 1);

    let cart = carts.get_cart(5).await.unwrap().data;
    assert_eq!(cart.item_count, 2);
}
