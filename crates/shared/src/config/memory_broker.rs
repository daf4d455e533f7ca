use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{Mutex, mpsc},
    task::{self, JoinHandle},
};
use tracing::{debug, error, info};

use crate::abstract_trait::{DynMessageHandler, MessageBrokerTrait};
use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
}

#[derive(Default)]
struct InMemoryBrokerInner {
    published: Mutex<Vec<PublishedMessage>>,
    queues: Mutex<HashMap<String, Vec<mpsc::UnboundedSender<PublishedMessage>>>>,
}

#[derive(Clone, Default)]
pub struct InMemoryBroker {
    inner: Arc<InMemoryBrokerInner>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn published(&self, topic: &str) -> Vec<PublishedMessage> {
        self.inner
            .published
            .lock()
            .await
            .iter()
            .filter(|m| m.topic == topic)
            .cloned()
            .collect()
    }

    pub async fn published_count(&self) -> usize {
        self.inner.published.lock().await.len()
    }
}

#[async_trait]
impl MessageBrokerTrait for InMemoryBroker {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), ServiceError> {
        let message = PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_vec(),
        };

        self.inner.published.lock().await.push(message.clone());

        let mut queues = self.inner.queues.lock().await;
        if let Some(senders) = queues.get_mut(topic) {
            senders.retain(|sender| sender.send(message.clone()).is_ok());
        }

        debug!(topic, key, "Message published in memory");
        Ok(())
    }

    async fn subscribe(
        &self,
        topics: Vec<String>,
        group_id: &str,
        handler: DynMessageHandler,
    ) -> Result<JoinHandle<()>, ServiceError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<PublishedMessage>();

        {
            let mut queues = self.inner.queues.lock().await;
            for topic in &topics {
                queues.entry(topic.clone()).or_default().push(tx.clone());
            }
        }

        info!(?topics, group_id, "In-memory subscription registered");

        let handle = task::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = handler
                    .handle(&message.topic, Some(&message.key), &message.payload)
                    .await
                {
                    error!(topic = message.topic, key = message.key, "Failed to handle message: {e}");
                }
            }
        });

        Ok(handle)
    }
}
