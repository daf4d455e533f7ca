use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, IntoParams, Clone)]
pub struct StockQuantityQuery {
    #[validate(range(min = 1))]
    pub quantity: i32,
}
