use async_trait::async_trait;
use rdkafka::Message;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::producer::{FutureProducer, FutureRecord};
use tokio::{
    task::{self, JoinHandle},
    time::{Duration, sleep},
};
use tracing::{debug, error, info, warn};

use crate::abstract_trait::{DynMessageHandler, MessageBrokerTrait};
use crate::errors::ServiceError;

pub struct Kafka {
    producer: FutureProducer,
    brokers: String,
}

impl Kafka {
    pub fn new(brokers: &str) -> Result<Self, ServiceError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "6000")
            .set("allow.auto.create.topics", "true")
            .create()?;

        info!("Kafka producer connected successfully");

        Ok(Kafka {
            producer,
            brokers: brokers.to_string(),
        })
    }

    fn create_consumer(&self, group_id: &str) -> Result<StreamConsumer, ServiceError> {
        // Offsets are auto-committed: a message whose handler failed is still
        // treated as consumed and is not redelivered.
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", group_id)
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "6000")
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "earliest")
            .set("allow.auto.create.topics", "true")
            .create()?;

        Ok(consumer)
    }
}

#[async_trait]
impl MessageBrokerTrait for Kafka {
    async fn publish(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), ServiceError> {
        self.producer
            .send(
                FutureRecord::to(topic).key(key).payload(payload),
                Duration::from_secs(0),
            )
            .await
            .map_err(|(kafka_error, _message)| {
                error!(topic, key, "Failed to deliver message: {kafka_error}");
                ServiceError::from(kafka_error)
            })?;

        debug!(topic, key, "Message sent successfully");
        Ok(())
    }

    async fn subscribe(
        &self,
        topics: Vec<String>,
        group_id: &str,
        handler: DynMessageHandler,
    ) -> Result<JoinHandle<()>, ServiceError> {
        let consumer = self.create_consumer(group_id)?;

        let topic_refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        consumer.subscribe(&topic_refs)?;

        info!(?topics, group_id, "✅ Kafka consumer started");

        let handle = task::spawn(async move {
            loop {
                match consumer.recv().await {
                    Err(e) => {
                        error!("Kafka receive error: {e}");
                        sleep(Duration::from_secs(5)).await;
                        continue;
                    }
                    Ok(message) => {
                        let topic = message.topic().to_string();

                        let payload = match message.payload() {
                            None => {
                                error!(topic, "Empty message payload");
                                continue;
                            }
                            Some(p) => {
                                debug!(topic, payload_len = p.len(), "Payload received");
                                p
                            }
                        };

                        let key = message.key().and_then(|k| std::str::from_utf8(k).ok());

                        if key.is_none() {
                            warn!(topic, "Message has no key");
                        }

                        if let Err(e) = handler.handle(&topic, key, payload).await {
                            error!(topic, key = ?key, "Failed to handle message: {e}");
                        }
                    }
                }
            }
        });

        Ok(handle)
    }
}
