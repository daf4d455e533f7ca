pub mod cart;
pub mod order;
pub mod product_client;
