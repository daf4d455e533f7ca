mod command;
mod memory;
mod processed_event;
mod query;

pub use self::command::ProductCommandRepository;
pub use self::memory::{InMemoryProcessedEventRepository, InMemoryProductRepository};
pub use self::processed_event::ProcessedEventRepository;
pub use self::query::ProductQueryRepository;
