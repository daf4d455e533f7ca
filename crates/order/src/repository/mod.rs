mod cart;
mod memory;
mod order;

pub use self::cart::CartRepository;
pub use self::memory::{InMemoryCartRepository, InMemoryOrderRepository};
pub use self::order::{OrderCommandRepository, OrderQueryRepository};
