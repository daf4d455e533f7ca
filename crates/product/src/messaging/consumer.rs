use shared::{
    abstract_trait::{DynMessageBroker, DynMessageHandler},
    domain::event::STOCK_UPDATE_TOPIC,
    errors::ServiceError,
};
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
    Finished,
    Shutdown,
}

pub struct StockEventConsumer {
    broker: DynMessageBroker,
    handler: DynMessageHandler,
    group_id: String,
}

impl StockEventConsumer {
    pub fn new(broker: DynMessageBroker, handler: DynMessageHandler, group_id: &str) -> Self {
        Self {
            broker,
            handler,
            group_id: group_id.to_string(),
        }
    }

    pub async fn start(&self) -> Result<JoinHandle<()>, ServiceError> {
        info!(group_id = %self.group_id, "🔄 Subscribing to {STOCK_UPDATE_TOPIC}");

        self.broker
            .subscribe(
                vec![STOCK_UPDATE_TOPIC.to_string()],
                &self.group_id,
                self.handler.clone(),
            )
            .await
    }

    /// On shutdown the subscription task is aborted and awaited.
    pub async fn run_until_shutdown(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<ConsumerExit, ServiceError> {
        let mut handle = self.start().await?;

        tokio::select! {
            result = &mut handle => {
                result.map_err(|e| ServiceError::Internal(format!("Stock consumer task failed: {e}")))?;
                Ok(ConsumerExit::Finished)
            }
            _ = shutdown.recv() => {
                handle.abort();
                if let Err(e) = handle.await {
                    if !e.is_cancelled() {
                        return Err(ServiceError::Internal(format!("Stock consumer task failed: {e}")));
                    }
                }
                info!(group_id = %self.group_id, "🛑 Stock consumer stopped");
                Ok(ConsumerExit::Shutdown)
            }
        }
    }
}
