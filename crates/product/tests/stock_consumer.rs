use product::{
    abstract_trait::product::repository::ProductQueryRepositoryTrait,
    di::DependenciesInjectDeps,
    messaging::{ConsumerExit, StockEventConsumer, StockEventOutcome},
    model::product::Product,
    repository::InMemoryProductRepository,
    state::AppState,
};
use shared::{
    abstract_trait::{DynMessageBroker, MessageBrokerTrait, MessageHandlerTrait},
    config::InMemoryBroker,
    domain::event::{STOCK_UPDATE_TOPIC, StockAdjustmentEvent},
};
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast;

fn product(id: i64, stock: i32) -> Product {
    Product {
        product_id: id,
        name: format!("Product {id}"),
        price: 2_000,
        stock_quantity: stock,
        active: true,
        created_at: None,
        updated_at: None,
    }
}

async fn setup(deduplicate: bool) -> (InMemoryProductRepository, AppState) {
    let store = InMemoryProductRepository::new();
    store.insert(product(10, 5)).await;

    let state = AppState::new(DependenciesInjectDeps::in_memory(store.clone(), deduplicate))
        .expect("state");

    (store, state)
}

async fn stock_of(store: &InMemoryProductRepository, id: i64) -> i32 {
    store.find_by_id(id).await.unwrap().unwrap().stock_quantity
}

#[tokio::test]
async fn reserve_and_release_events_adjust_stock() {
    let (store, state) = setup(false).await;
    let handler = &state.di_container.stock_handler;

    let outcome = handler
        .handle_event(&StockAdjustmentEvent::reserve(10, 2))
        .await
        .unwrap();
    assert_eq!(outcome, StockEventOutcome::Reserved);
    assert_eq!(stock_of(&store, 10).await, 3);

    let outcome = handler
        .handle_event(&StockAdjustmentEvent::release(10, 2))
        .await
        .unwrap();
    assert_eq!(outcome, StockEventOutcome::Released);
    assert_eq!(stock_of(&store, 10).await, 5);
}

#[tokio::test]
async fn insufficient_stock_is_a_rejected_outcome_not_an_error() {
    let (store, state) = setup(false).await;

    let outcome = state
        .di_container
        .stock_handler
        .handle_event(&StockAdjustmentEvent::reserve(10, 6))
        .await
        .unwrap();

    assert_eq!(outcome, StockEventOutcome::Rejected);
    assert_eq!(stock_of(&store, 10).await, 5);
}

#[tokio::test]
async fn keyed_events_are_deduplicated_when_store_is_configured() {
    let (store, state) = setup(true).await;
    let handler = &state.di_container.stock_handler;
    let event = StockAdjustmentEvent::release(10, 2).with_idempotency_key("ORD-1:1:RELEASE");

    assert_eq!(
        handler.handle_event(&event).await.unwrap(),
        StockEventOutcome::Released
    );
    assert_eq!(
        handler.handle_event(&event).await.unwrap(),
        StockEventOutcome::Duplicate
    );
    assert_eq!(stock_of(&store, 10).await, 7);
}

#[tokio::test]
async fn keyless_replay_is_applied_again_even_with_dedup_store() {
    let (store, state) = setup(true).await;
    let handler = &state.di_container.stock_handler;
    let event = StockAdjustmentEvent::release(10, 2);

    handler.handle_event(&event).await.unwrap();
    handler.handle_event(&event).await.unwrap();

    assert_eq!(stock_of(&store, 10).await, 9);
}

#[tokio::test]
async fn keyed_replay_without_dedup_store_is_applied_again() {
    let (store, state) = setup(false).await;
    let handler = &state.di_container.stock_handler;
    let event = StockAdjustmentEvent::release(10, 1).with_idempotency_key("ORD-2:4:RELEASE");

    handler.handle_event(&event).await.unwrap();
    handler.handle_event(&event).await.unwrap();

    assert_eq!(stock_of(&store, 10).await, 7);
}

#[tokio::test]
async fn failed_event_releases_its_claim() {
    let (store, state) = setup(true).await;
    let handler = &state.di_container.stock_handler;

    let missing = StockAdjustmentEvent::release(404, 1).with_idempotency_key("ORD-3:9:RELEASE");
    assert!(handler.handle_event(&missing).await.is_err());

    store.insert(product(404, 0)).await;
    assert_eq!(
        handler.handle_event(&missing).await.unwrap(),
        StockEventOutcome::Released
    );
    assert_eq!(stock_of(&store, 404).await, 1);
}

#[tokio::test]
async fn malformed_and_invalid_payloads_are_errors() {
    let (store, state) = setup(false).await;
    let handler = &state.di_container.stock_handler;

    assert!(
        handler
            .handle(STOCK_UPDATE_TOPIC, None, b"{not json")
            .await
            .is_err()
    );

    let zero = serde_json::to_vec(&StockAdjustmentEvent::reserve(10, 0)).unwrap();
    assert!(handler.handle(STOCK_UPDATE_TOPIC, None, &zero).await.is_err());

    assert_eq!(stock_of(&store, 10).await, 5);
}

#[tokio::test]
async fn wire_payload_uses_camel_case_and_upper_operation() {
    let (store, state) = setup(false).await;

    let payload = br#"{"productId":10,"quantityChanged":4,"operation":"RESERVE"}"#;
    state
        .di_container
        .stock_handler
        .handle(STOCK_UPDATE_TOPIC, Some("k"), payload)
        .await
        .unwrap();

    assert_eq!(stock_of(&store, 10).await, 1);
}

#[tokio::test]
async fn subscribed_consumer_applies_published_events() {
    let (store, state) = setup(false).await;
    let broker = InMemoryBroker::new();
    let dyn_broker: DynMessageBroker = Arc::new(broker.clone());

    let consumer = StockEventConsumer::new(
        dyn_broker,
        state.di_container.stock_handler.clone(),
        "product-service-group",
    );
    let handle = consumer.start().await.unwrap();

    let payload = serde_json::to_vec(&StockAdjustmentEvent::reserve(10, 2)).unwrap();
    broker
        .publish(STOCK_UPDATE_TOPIC, "ORD-9:1:RESERVE", &payload)
        .await
        .unwrap();

    let mut stock = stock_of(&store, 10).await;
    for _ in 0..100 {
        if stock == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        stock = stock_of(&store, 10).await;
    }

    assert_eq!(stock, 3);
    handle.abort();
}

#[tokio::test]
async fn shutdown_stops_the_subscription() {
    let (store, state) = setup(false).await;
    let broker = InMemoryBroker::new();
    let dyn_broker: DynMessageBroker = Arc::new(broker.clone());
    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let consumer = StockEventConsumer::new(
        dyn_broker,
        state.di_container.stock_handler.clone(),
        "product-service-group",
    );
    let run = tokio::spawn(async move { consumer.run_until_shutdown(&mut shutdown_rx).await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    shutdown_tx.send(()).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(1), run)
        .await
        .expect("consumer did not stop")
        .unwrap()
        .unwrap();
    assert_eq!(exit, ConsumerExit::Shutdown);

    let payload = serde_json::to_vec(&StockAdjustmentEvent::reserve(10, 2)).unwrap();
    broker
        .publish(STOCK_UPDATE_TOPIC, "ORD-9:1:RESERVE", &payload)
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(stock_of(&store, 10).await, 5);
}
