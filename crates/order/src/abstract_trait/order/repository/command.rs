use crate::{
    domain::requests::order::CreateOrderRecordRequest,
    model::order::{OrderStatus, OrderWithItems},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderWithItems, RepositoryError>;

    /// `Ok(None)` when the order is already COMPLETED or CANCELLED.
    async fn transition_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> Result<Option<OrderWithItems>, RepositoryError>;
}
