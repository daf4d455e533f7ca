pub mod event;
pub mod responses;
