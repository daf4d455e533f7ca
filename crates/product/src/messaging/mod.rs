mod consumer;
mod handler;

pub use self::consumer::{ConsumerExit, StockEventConsumer};
pub use self::handler::{StockAdjustmentHandler, StockAdjustmentHandlerDeps, StockEventOutcome};
