mod database;
mod kafka;
mod memory_broker;

pub use self::database::{ConnectionManager, ConnectionPool};
pub use self::kafka::Kafka;
pub use self::memory_broker::{InMemoryBroker, PublishedMessage};
