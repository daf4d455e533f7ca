mod common;

use common::{Harness, StubProductClient};
use order::{
    abstract_trait::product_client::ProductClientTrait,
    domain::requests::order::{CreateOrderItemRequest, CreateOrderRequest, UpdateOrderStatusRequest},
    product_client::{
        CircuitBreakerConfig, CircuitBreakerProductClient, CircuitState, FALLBACK_PRODUCT_NAME,
    },
};
use shared::{
    domain::{
        event::{ORDER_CREATED_TOPIC, OrderCreatedEvent, StockOperation},
        responses::ProductResponse,
    },
    errors::ServiceError,
};
use std::{sync::Arc, time::Duration};

fn request(customer_id: i64, items: &[(i64, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        customer_id,
        items: items
            .iter()
            .map(|&(product_id, quantity)| CreateOrderItemRequest {
                product_id,
                quantity,
            })
            .collect(),
        shipping_address: "Jl. Merdeka 1, Bandung".into(),
    }
}

fn status(value: &str) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest {
        status: value.into(),
    }
}

#[tokio::test]
async fn create_order_persists_and_emits_reservations() {
    let products = StubProductClient::new().with(10, 1_500, 5).with(20, 300, 10);
    let h = Harness::new(products);
    let orders = &h.state.di_container.order_command;

    let created = orders
        .create_order(&request(7, &[(10, 2), (20, 1)]))
        .await
        .unwrap()
        .data;

    assert_eq!(created.status, "PENDING");
    assert_eq!(created.total_amount, 3_300);
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].price_at_purchase, 1_500);
    assert_eq!(created.items[0].subtotal, 3_000);
    assert!(created.order_number.starts_with("ORD-"));
    assert_eq!(h.orders.count().await, 1);

    let events = h.stock_events().await;
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.operation == StockOperation::Reserve));
    assert_eq!((events[0].product_id, events[0].quantity_changed), (10, 2));
    assert_eq!((events[1].product_id, events[1].quantity_changed), (20, 1));

    let first_key = events[0].idempotency_key.as_deref().unwrap();
    assert_eq!(
        first_key,
        format!("{}:{}:RESERVE", created.order_number, created.items[0].id)
    );

    let notices = h.broker.published(ORDER_CREATED_TOPIC).await;
    assert_eq!(notices.len(), 1);
    let notice: OrderCreatedEvent = serde_json::from_slice(&notices[0].payload).unwrap();
    assert_eq!(notice.order_id, created.id);
    assert_eq!(notice.customer_id, 7);
    assert_eq!(notices[0].key, created.order_number);
}

#[tokio::test]
async fn insufficient_stock_leaves_no_trace() {
    let products = StubProductClient::new().with(10, 1_500, 2);
    let h = Harness::new(products);

    let err = h
        .state
        .di_container
        .order_command
        .create_order(&request(7, &[(10, 3)]))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::InsufficientStock {
            product_id: 10,
            requested: 3,
            available: 2
        }
    ));
    assert_eq!(h.orders.count().await, 0);
    assert_eq!(h.broker.published_count().await, 0);
}

#[tokio::test]
async fn repeated_lines_are_checked_against_stock_together() {
    let products = StubProductClient::new().with(10, 1_500, 5);
    let h = Harness::new(products);

    let err = h
        .state
        .di_container
        .order_command
        .create_order(&request(7, &[(10, 3), (10, 3)]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InsufficientStock { requested: 6, .. }));
    assert_eq!(h.broker.published_count().await, 0);
}

#[tokio::test]
async fn unknown_or_inactive_products_are_rejected() {
    let products = StubProductClient::new().with(10, 1_500, 5);
    products.put(ProductResponse {
        id: 30,
        name: "Discontinued".into(),
        price: 100,
        stock_quantity: 50,
        active: false,
    });
    let h = Harness::new(products);
    let orders = &h.state.di_container.order_command;

    let err = orders
        .create_order(&request(7, &[(10, 1), (99, 1)]))
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = orders
        .create_order(&request(7, &[(30, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert_eq!(h.orders.count().await, 0);
    assert_eq!(h.broker.published_count().await, 0);
}

#[tokio::test]
async fn invalid_requests_fail_validation() {
    let products = StubProductClient::new().with(10, 1_500, 5);
    let h = Harness::new(products.clone());
    let orders = &h.state.di_container.order_command;

    let err = orders.create_order(&request(7, &[])).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = orders.create_order(&request(7, &[(10, 0)])).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let mut blank_address = request(7, &[(10, 1)]);
    blank_address.shipping_address.clear();
    let err = orders.create_order(&blank_address).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert_eq!(products.calls(), 0);
}

#[tokio::test]
async fn cancellation_releases_every_line_once() {
    let products = StubProductClient::new().with(1, 1_000, 10).with(2, 500, 10);
    let h = Harness::new(products);
    let orders = &h.state.di_container.order_command;

    let created = orders
        .create_order(&request(7, &[(1, 2), (2, 1)]))
        .await
        .unwrap()
        .data;

    let cancelled = orders.cancel_order(created.id).await.unwrap().data;
    assert_eq!(cancelled.status, "CANCELLED");

    let releases: Vec<_> = h
        .stock_events()
        .await
        .into_iter()
        .filter(|e| e.operation == StockOperation::Release)
        .collect();
    assert_eq!(releases.len(), 2);
    assert_eq!((releases[0].product_id, releases[0].quantity_changed), (1, 2));
    assert_eq!((releases[1].product_id, releases[1].quantity_changed), (2, 1));

    let err = orders.cancel_order(created.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let release_count = h
        .stock_events()
        .await
        .iter()
        .filter(|e| e.operation == StockOperation::Release)
        .count();
    assert_eq!(release_count, 2);
}

#[tokio::test]
async fn cancelling_missing_order_is_not_found() {
    let h = Harness::new(StubProductClient::new());

    let err = h
        .state
        .di_container
        .order_command
        .cancel_order(404)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancellations_release_once() {
    let products = StubProductClient::new().with(1, 1_000, 10);
    let h = Harness::new(products);
    let orders = h.state.di_container.order_command.clone();

    let created = orders
        .create_order(&request(7, &[(1, 4)]))
        .await
        .unwrap()
        .data;

    let tasks: Vec<_> = (0..2)
        .map(|_| {
            let orders = orders.clone();
            tokio::spawn(async move { orders.cancel_order(created.id).await })
        })
        .collect();

    let mut succeeded = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            succeeded += 1;
        }
    }
    assert_eq!(succeeded, 1);

    let releases = h
        .stock_events()
        .await
        .iter()
        .filter(|e| e.operation == StockOperation::Release)
        .count();
    assert_eq!(releases, 1);
}

#[tokio::test]
async fn status_moves_forward_until_terminal() {
    let products = StubProductClient::new().with(1, 1_000, 10);
    let h = Harness::new(products);
    let orders = &h.state.di_container.order_command;

    let created = orders
        .create_order(&request(7, &[(1, 1)]))
        .await
        .unwrap()
        .data;

    let updated = orders
        .update_order_status(created.id, &status("processing"))
        .await
        .unwrap()
        .data;
    assert_eq!(updated.status, "PROCESSING");

    let updated = orders
        .update_order_status(created.id, &status("COMPLETED"))
        .await
        .unwrap()
        .data;
    assert_eq!(updated.status, "COMPLETED");

    let err = orders
        .update_order_status(created.id, &status("PENDING"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let err = orders.cancel_order(created.id).await.unwrap_err();
    assert!(matches!(err, ServiceError::InvalidState(_)));

    let err = orders
        .update_order_status(created.id, &status("SHIPPED"))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn status_update_to_cancelled_compensates() {
    let products = StubProductClient::new().with(1, 1_000, 10);
    let h = Harness::new(products);
    let orders = &h.state.di_container.order_command;

    let created = orders
        .create_order(&request(7, &[(1, 3)]))
        .await
        .unwrap()
        .data;

    let updated = orders
        .update_order_status(created.id, &status("CANCELLED"))
        .await
        .unwrap()
        .data;
    assert_eq!(updated.status, "CANCELLED");

    let release = h
        .stock_events()
        .await
        .into_iter()
        .find(|e| e.operation == StockOperation::Release)
        .expect("release event");
    assert_eq!((release.product_id, release.quantity_changed), (1, 3));
}

#[tokio::test]
async fn queries_find_orders_by_id_number_and_customer() {
    let products = StubProductClient::new().with(1, 1_000, 10);
    let h = Harness::new(products);
    let orders = &h.state.di_container.order_command;
    let queries = &h.state.di_container.order_query;

    let first = orders.create_order(&request(7, &[(1, 1)])).await.unwrap().data;
    orders.create_order(&request(7, &[(1, 2)])).await.unwrap();
    orders.create_order(&request(8, &[(1, 1)])).await.unwrap();

    assert_eq!(queries.find_all().await.unwrap().data.len(), 3);
    assert_eq!(queries.find_by_customer(7).await.unwrap().data.len(), 2);
    assert!(queries.find_by_customer(9).await.unwrap().data.is_empty());

    let by_id = queries.find_by_id(first.id).await.unwrap().data;
    assert_eq!(by_id.order_number, first.order_number);
    assert_eq!(by_id.items, first.items);

    let by_number = queries
        .find_by_order_number(&first.order_number)
        .await
        .unwrap()
        .data;
    assert_eq!(by_number.id, first.id);

    assert!(queries.find_by_id(999).await.unwrap_err().is_not_found());
    assert!(
        queries
            .find_by_order_number("ORD-MISSING")
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn open_breaker_short_circuits_to_fallback() {
    let remote = StubProductClient::new().with(1, 1_000, 10);
    remote.set_unavailable(true);

    let guarded = Arc::new(CircuitBreakerProductClient::new(
        remote.clone(),
        CircuitBreakerConfig {
            failure_threshold: 3,
            open_duration: Duration::from_secs(60),
            call_timeout: Duration::from_secs(1),
        },
    ));
    let h = Harness::new(guarded.clone());
    let orders = &h.state.di_container.order_command;

    for _ in 0..3 {
        let err = orders
            .create_order(&request(7, &[(1, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DependencyUnavailable(_)));
    }
    assert_eq!(remote.calls(), 3);
    assert_eq!(guarded.breaker().state(), CircuitState::Open);

    // The fallback has zero stock, so the order is refused without a remote call.
    let err = orders
        .create_order(&request(7, &[(1, 1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InsufficientStock { available: 0, .. }));
    assert_eq!(remote.calls(), 3);

    let fallback = guarded.find_by_id(12345).await.unwrap();
    assert_eq!(fallback.id, 12345);
    assert_eq!(fallback.name, FALLBACK_PRODUCT_NAME);
    assert_eq!(fallback.stock_quantity, 0);
    assert!(!fallback.active);
    assert_eq!(remote.calls(), 3);

    assert_eq!(h.orders.count().await, 0);
    assert_eq!(h.broker.published_count().await, 0);
}
