mod repository;
mod service;

pub use self::repository::{CartLock, CartLockTrait, CartRepositoryTrait, DynCartRepository};
pub use self::service::{CartServiceTrait, DynCartService};
