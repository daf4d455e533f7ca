use serde::Serialize;
use tracing::{debug, error};

use crate::abstract_trait::DynMessageBroker;
use crate::errors::ServiceError;

#[derive(Clone)]
pub struct EventBus {
    broker: DynMessageBroker,
}

impl EventBus {
    pub fn new(broker: DynMessageBroker) -> Self {
        Self { broker }
    }

    pub async fn publish<T>(&self, topic: &str, key: &str, event: &T) -> Result<(), ServiceError>
    where
        T: Serialize + Sync,
    {
        let payload = serde_json::to_vec(event)
            .map_err(|e| ServiceError::Internal(format!("Failed to serialize event: {e}")))?;

        self.broker
            .publish(topic, key, &payload)
            .await
            .map_err(|e| {
                error!("Failed to publish event to {}: {:?}", topic, e);
                e
            })?;

        debug!(topic, key, "Event published");

        Ok(())
    }
}
