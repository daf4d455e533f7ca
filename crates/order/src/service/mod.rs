mod cart;
mod order;

pub use self::cart::{CartService, CartServiceDeps};
pub use self::order::{OrderCommandService, OrderCommandServiceDeps, OrderQueryService};
