use crate::state::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use prometheus_client::{encoding::text::encode, metrics::counter::Counter, registry::Registry};
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct StockMetrics {
    pub reserved: Counter,
    pub rejected: Counter,
    pub released: Counter,
    pub duplicates: Counter,
    pub failures: Counter,
}

impl StockMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "stock_reservation_applied",
            "RESERVE events that decremented stock",
            self.reserved.clone(),
        );
        registry.register(
            "stock_reservation_rejected",
            "RESERVE events refused for insufficient stock",
            self.rejected.clone(),
        );
        registry.register(
            "stock_release_applied",
            "RELEASE events that incremented stock",
            self.released.clone(),
        );
        registry.register(
            "stock_event_duplicate",
            "Stock events skipped because their idempotency key was already processed",
            self.duplicates.clone(),
        );
        registry.register(
            "stock_event_failed",
            "Stock events that could not be processed",
            self.failures.clone(),
        );
    }
}

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let mut buffer = String::new();

    let registry = state.registry.lock().await;

    if let Err(e) = encode(&mut buffer, &registry) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {e}"),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        [(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        buffer,
    )
        .into_response()
}
