use crate::{
    abstract_trait::product::{
        repository::{DynProductCommandRepository, DynProductQueryRepository},
        service::ProductCommandServiceTrait,
    },
    domain::response::stock::StockAdjustmentResponse,
};
use anyhow::Result;
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::{event::StockOperation, responses::ApiResponse},
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, complete_tracing, start_tracing},
};
use tracing::{error, info, warn};

const TRACER: &str = "product-command-service";

pub struct ProductCommandServiceDeps {
    pub query: DynProductQueryRepository,
    pub command: DynProductCommandRepository,
}

#[derive(Clone)]
pub struct ProductCommandService {
    query: DynProductQueryRepository,
    command: DynProductCommandRepository,
    metrics: Metrics,
}

impl ProductCommandService {
    pub fn new(deps: ProductCommandServiceDeps, registry: &mut Registry) -> Result<Self> {
        let ProductCommandServiceDeps { query, command } = deps;

        let metrics = Metrics::new();
        metrics.register(
            "product_command_service",
            "ProductCommandService",
            registry,
        );

        Ok(Self {
            query,
            command,
            metrics,
        })
    }

    fn validate_quantity(qty: i32) -> Result<(), ServiceError> {
        if qty <= 0 {
            return Err(ServiceError::validation(format!(
                "quantity must be positive, got {qty}"
            )));
        }
        Ok(())
    }

    async fn current_stock(&self, product_id: i64) -> Result<i32, ServiceError> {
        match self.query.find_by_id(product_id).await? {
            Some(product) => Ok(product.stock_quantity),
            None => Err(ServiceError::NotFound(format!(
                "Product with id {product_id} not found"
            ))),
        }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn reserve_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<ApiResponse<StockAdjustmentResponse>, ServiceError> {
        Self::validate_quantity(qty)?;

        let method = Method::Post;
        let tracing_ctx = start_tracing(
            TRACER,
            "ReserveStock",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", product_id),
                KeyValue::new("stock.quantity", qty as i64),
            ],
        );

        let outcome = match self.command.reserve_stock(product_id, qty).await {
            Ok(outcome) => outcome,
            Err(RepositoryError::NotFound) => {
                let msg = format!("Product with id {product_id} not found");
                complete_tracing(&tracing_ctx, &self.metrics, method, false, &msg);
                return Err(ServiceError::NotFound(msg));
            }
            Err(e) => {
                error!("❌ Reserve failed for product {}: {:?}", product_id, e);
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    false,
                    &format!("Database error: {e}"),
                );
                return Err(ServiceError::Repo(e));
            }
        };

        let response = match outcome {
            Some(product) => {
                info!(
                    "✅ Reserved {} units of product {} (remaining {})",
                    qty, product_id, product.stock_quantity
                );
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    true,
                    "Stock reserved",
                );
                ApiResponse {
                    status: "success".into(),
                    message: "Stock reserved".into(),
                    data: StockAdjustmentResponse {
                        product_id,
                        operation: StockOperation::Reserve,
                        quantity: qty,
                        applied: true,
                        stock_quantity: product.stock_quantity,
                    },
                }
            }
            None => {
                let available = self.current_stock(product_id).await?;
                warn!(
                    "⚠️ Reservation of {} units refused for product {} (available {})",
                    qty, product_id, available
                );
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    true,
                    "Insufficient stock, reservation refused",
                );
                ApiResponse {
                    status: "rejected".into(),
                    message: "Insufficient stock".into(),
                    data: StockAdjustmentResponse {
                        product_id,
                        operation: StockOperation::Reserve,
                        quantity: qty,
                        applied: false,
                        stock_quantity: available,
                    },
                }
            }
        };

        Ok(response)
    }

    async fn release_stock(
        &self,
        product_id: i64,
        qty: i32,
    ) -> Result<ApiResponse<StockAdjustmentResponse>, ServiceError> {
        Self::validate_quantity(qty)?;

        let method = Method::Post;
        let tracing_ctx = start_tracing(
            TRACER,
            "ReleaseStock",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", product_id),
                KeyValue::new("stock.quantity", qty as i64),
            ],
        );

        let product = match self.command.release_stock(product_id, qty).await {
            Ok(product) => product,
            Err(RepositoryError::NotFound) => {
                let msg = format!("Product with id {product_id} not found");
                complete_tracing(&tracing_ctx, &self.metrics, method, false, &msg);
                return Err(ServiceError::NotFound(msg));
            }
            Err(e) => {
                error!("❌ Release failed for product {}: {:?}", product_id, e);
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    false,
                    &format!("Database error: {e}"),
                );
                return Err(ServiceError::Repo(e));
            }
        };

        complete_tracing(&tracing_ctx, &self.metrics, method, true, "Stock released");

        Ok(ApiResponse {
            status: "success".into(),
            message: "Stock released".into(),
            data: StockAdjustmentResponse {
                product_id,
                operation: StockOperation::Release,
                quantity: qty,
                applied: true,
                stock_quantity: product.stock_quantity,
            },
        })
    }
}
