pub mod processed_event;
pub mod product;
