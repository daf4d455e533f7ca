pub mod abstract_trait;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod middleware;
pub mod utils;
