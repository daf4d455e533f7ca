use crate::errors::ServiceError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub type DynMessageBroker = Arc<dyn MessageBrokerTrait + Send + Sync>;
pub type DynMessageHandler = Arc<dyn MessageHandlerTrait + Send + Sync>;

/// Delivery is at-least-once; the same payload may arrive more than once.
#[async_trait]
pub trait MessageHandlerTrait {
    async fn handle(
        &self,
        topic: &str,
        key: Option<&str>,
        payload: &[u8],
    ) -> Result<(), ServiceError>;
}

#[async_trait]
pub trait MessageBrokerTrait {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), ServiceError>;

    async fn subscribe(
        &self,
        topics: Vec<String>,
        group_id: &str,
        handler: DynMessageHandler,
    ) -> Result<JoinHandle<()>, ServiceError>;
}
