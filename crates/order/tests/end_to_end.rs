use order::{
    abstract_trait::product_client::{DynProductClient, ProductClientTrait},
    di::DependenciesInjectDeps as OrderDeps,
    domain::requests::{
        cart::AddCartItemRequest,
        order::{CreateOrderItemRequest, CreateOrderRequest},
    },
    product_client::{
        CircuitBreakerConfig, CircuitBreakerProductClient, CircuitState, FALLBACK_PRODUCT_NAME,
        ProductHttpClient,
    },
    repository::{InMemoryCartRepository, InMemoryOrderRepository},
    state::AppState as OrderState,
};
use product::{
    abstract_trait::product::repository::ProductQueryRepositoryTrait,
    di::DependenciesInjectDeps as ProductDeps, handler::AppRouter as ProductRouter,
    messaging::StockEventConsumer, model::product::Product, repository::InMemoryProductRepository,
    state::AppState as ProductState,
};
use shared::{
    abstract_trait::DynMessageBroker,
    config::InMemoryBroker,
    domain::event::{STOCK_UPDATE_TOPIC, StockAdjustmentEvent, StockOperation},
    errors::ServiceError,
};
use std::{sync::Arc, time::Duration};

const PRICE: i64 = 12_500;

struct ProductService {
    base_url: String,
    store: InMemoryProductRepository,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ProductService {
    async fn spawn(broker: DynMessageBroker) -> Self {
        let store = InMemoryProductRepository::new();
        store
            .insert(Product {
                product_id: 10,
                name: "Espresso Grinder".into(),
                price: PRICE,
                stock_quantity: 5,
                active: true,
                created_at: None,
                updated_at: None,
            })
            .await;

        let state = Arc::new(
            ProductState::new(ProductDeps::in_memory(store.clone(), true)).expect("product state"),
        );

        let consumer = StockEventConsumer::new(
            broker,
            state.di_container.stock_handler.clone(),
            "product-service-group",
        );
        let consumer_handle = consumer.start().await.expect("subscribe");

        let app = ProductRouter::build(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
            handles: vec![consumer_handle, server_handle],
        }
    }

    async fn stock(&self) -> i32 {
        self.store.find_by_id(10).await.unwrap().unwrap().stock_quantity
    }

    async fn wait_for_stock(&self, expected: i32) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.stock().await != expected {
            assert!(
                tokio::time::Instant::now() < deadline,
                "stock never reached {expected}, still {}",
                self.stock().await
            );
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Drop for ProductService {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

fn guarded_client(base_url: &str, failure_threshold: u32) -> Arc<CircuitBreakerProductClient> {
    let http = ProductHttpClient::new(base_url, Duration::from_secs(2)).expect("http client");
    Arc::new(CircuitBreakerProductClient::new(
        Arc::new(http),
        CircuitBreakerConfig {
            failure_threshold,
            open_duration: Duration::from_secs(60),
            call_timeout: Duration::from_secs(2),
        },
    ))
}

fn order_state(product_client: DynProductClient, broker: DynMessageBroker) -> OrderState {
    OrderState::new(OrderDeps::in_memory(
        InMemoryOrderRepository::new(),
        InMemoryCartRepository::new(),
        product_client,
        broker,
    ))
    .expect("order state")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cart_to_order_to_reserved_stock() {
    let broker = InMemoryBroker::new();
    let products = ProductService::spawn(Arc::new(broker.clone())).await;
    let orders = order_state(
        guarded_client(&products.base_url, 5),
        Arc::new(broker.clone()),
    );

    let cart = orders
        .di_container
        .cart_service
        .add_item(
            1,
            &AddCartItemRequest {
                product_id: 10,
                quantity: 2,
            },
        )
        .await
        .unwrap()
        .data;
    assert_eq!(cart.total, 2 * PRICE);
    assert_eq!(cart.item_count, 2);
    assert_eq!(cart.items[0].product_name.as_deref(), Some("Espresso Grinder"));

    let order = orders
        .di_container
        .order_command
        .create_order(&CreateOrderRequest {
            customer_id: 1,
            items: vec![CreateOrderItemRequest {
                product_id: 10,
                quantity: 2,
            }],
            shipping_address: "Jl. Cihampelas 99, Bandung".into(),
        })
        .await
        .unwrap()
        .data;
    assert_eq!(order.status, "PENDING");
    assert_eq!(order.total_amount, 2 * PRICE);

    let reserves: Vec<StockAdjustmentEvent> = broker
        .published(STOCK_UPDATE_TOPIC)
        .await
        .iter()
        .map(|m| serde_json::from_slice(&m.payload).unwrap())
        .collect();
    assert_eq!(reserves.len(), 1);
    assert_eq!(reserves[0].operation, StockOperation::Reserve);
    assert_eq!((reserves[0].product_id, reserves[0].quantity_changed), (10, 2));

    products.wait_for_stock(3).await;

    orders
        .di_container
        .order_command
        .cancel_order(order.id)
        .await
        .unwrap();

    products.wait_for_stock(5).await;
}

#[tokio::test]
async fn unreachable_product_service_trips_the_breaker() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = guarded_client(&format!("http://{addr}"), 2);

    for _ in 0..2 {
        let err = client.find_by_id(10).await.unwrap_err();
        assert!(matches!(err, ServiceError::DependencyUnavailable(_)));
    }
    assert_eq!(client.breaker().state(), CircuitState::Open);

    let fallback = client.find_by_id(10).await.unwrap();
    assert_eq!(fallback.name, FALLBACK_PRODUCT_NAME);
    assert_eq!(fallback.price, 0);
    assert_eq!(fallback.stock_quantity, 0);
}

#[tokio::test]
async fn missing_product_does_not_trip_the_breaker() {
    let broker = InMemoryBroker::new();
    let products = ProductService::spawn(Arc::new(broker)).await;
    let client = guarded_client(&products.base_url, 1);

    for _ in 0..3 {
        let err = client.find_by_id(404).await.unwrap_err();
        assert!(err.is_not_found());
    }

    assert_eq!(client.breaker().state(), CircuitState::Closed);
    assert_eq!(client.find_by_id(10).await.unwrap().name, "Espresso Grinder");
}
