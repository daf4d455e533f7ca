use crate::{
    abstract_trait::{
        processed_event::DynProcessedEventRepository,
        product::service::DynProductCommandService,
    },
    metrics::StockMetrics,
};
use async_trait::async_trait;
use shared::{
    abstract_trait::MessageHandlerTrait,
    domain::event::{STOCK_UPDATE_TOPIC, StockAdjustmentEvent, StockOperation},
    errors::ServiceError,
};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEventOutcome {
    Reserved,
    Rejected,
    Released,
    Duplicate,
}

pub struct StockAdjustmentHandlerDeps {
    pub product_command: DynProductCommandService,
    pub processed_events: Option<DynProcessedEventRepository>,
    pub metrics: StockMetrics,
}

pub struct StockAdjustmentHandler {
    product_command: DynProductCommandService,
    processed_events: Option<DynProcessedEventRepository>,
    metrics: StockMetrics,
}

impl StockAdjustmentHandler {
    pub fn new(deps: StockAdjustmentHandlerDeps) -> Self {
        let StockAdjustmentHandlerDeps {
            product_command,
            processed_events,
            metrics,
        } = deps;

        Self {
            product_command,
            processed_events,
            metrics,
        }
    }

    pub async fn handle_event(
        &self,
        event: &StockAdjustmentEvent,
    ) -> Result<StockEventOutcome, ServiceError> {
        if event.quantity_changed <= 0 {
            return Err(ServiceError::validation(format!(
                "quantityChanged must be positive, got {}",
                event.quantity_changed
            )));
        }

        let claimed_key = match (&self.processed_events, event.idempotency_key.as_deref()) {
            (Some(store), Some(key)) => {
                if !store.try_claim(key).await? {
                    info!(key, "🔁 Stock event already processed, skipping");
                    self.metrics.duplicates.inc();
                    return Ok(StockEventOutcome::Duplicate);
                }
                Some((store, key))
            }
            _ => None,
        };

        let result = self.apply(event).await;

        if result.is_err()
            && let Some((store, key)) = claimed_key
            && let Err(e) = store.release_claim(key).await
        {
            error!(key, "❌ Failed to release claim on stock event: {e}");
        }

        result
    }

    async fn apply(&self, event: &StockAdjustmentEvent) -> Result<StockEventOutcome, ServiceError> {
        let product_id = event.product_id;
        let qty = event.quantity_changed;

        match event.operation {
            StockOperation::Reserve => {
                let response = self.product_command.reserve_stock(product_id, qty).await?;

                if response.data.applied {
                    self.metrics.reserved.inc();
                    Ok(StockEventOutcome::Reserved)
                } else {
                    warn!(
                        product_id,
                        requested = qty,
                        available = response.data.stock_quantity,
                        "⚠️ Insufficient stock for reservation, event dropped"
                    );
                    self.metrics.rejected.inc();
                    Ok(StockEventOutcome::Rejected)
                }
            }
            StockOperation::Release => {
                self.product_command.release_stock(product_id, qty).await?;
                self.metrics.released.inc();
                Ok(StockEventOutcome::Released)
            }
        }
    }
}

#[async_trait]
impl MessageHandlerTrait for StockAdjustmentHandler {
    async fn handle(
        &self,
        topic: &str,
        key: Option<&str>,
        payload: &[u8],
    ) -> Result<(), ServiceError> {
        if topic != STOCK_UPDATE_TOPIC {
            debug!(topic, "Ignoring message from unexpected topic");
            return Ok(());
        }

        let event: StockAdjustmentEvent = match serde_json::from_slice(payload) {
            Ok(event) => event,
            Err(e) => {
                self.metrics.failures.inc();
                error!(topic, key = ?key, "❌ Malformed stock event: {e}");
                return Err(ServiceError::validation(format!(
                    "malformed stock event: {e}"
                )));
            }
        };

        info!(
            product_id = event.product_id,
            quantity = event.quantity_changed,
            operation = %event.operation,
            "📦 Processing stock event"
        );

        match self.handle_event(&event).await {
            Ok(outcome) => {
                debug!(product_id = event.product_id, ?outcome, "Stock event processed");
                Ok(())
            }
            Err(e) => {
                self.metrics.failures.inc();
                error!(
                    product_id = event.product_id,
                    operation = %event.operation,
                    "❌ Failed to process stock event: {e}"
                );
                Err(e)
            }
        }
    }
}
