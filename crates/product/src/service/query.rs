use crate::abstract_trait::product::{
    repository::DynProductQueryRepository, service::ProductQueryServiceTrait,
};
use anyhow::Result;
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::{ApiResponse, ProductResponse},
    errors::ServiceError,
    utils::{Method, Metrics, complete_tracing, start_tracing},
};
use tracing::{error, info};

const TRACER: &str = "product-query-service";

#[derive(Clone)]
pub struct ProductQueryService {
    query: DynProductQueryRepository,
    metrics: Metrics,
}

impl ProductQueryService {
    pub fn new(query: DynProductQueryRepository, registry: &mut Registry) -> Result<Self> {
        let metrics = Metrics::new();
        metrics.register(
            "product_query_service",
            "ProductQueryService",
            registry,
        );

        Ok(Self { query, metrics })
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_by_id(&self, id: i64) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🔍 Fetching product by ID: {}", id);

        let method = Method::Get;
        let tracing_ctx = start_tracing(
            TRACER,
            "FindProductById",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id),
            ],
        );

        let product = match self.query.find_by_id(id).await {
            Ok(Some(product)) => product,
            Ok(None) => {
                let msg = format!("Product with id {id} not found");
                complete_tracing(&tracing_ctx, &self.metrics, method, false, &msg);
                return Err(ServiceError::NotFound(msg));
            }
            Err(e) => {
                error!("❌ Failed to fetch product {}: {:?}", id, e);
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

        complete_tracing(
            &tracing_ctx,
            &self.metrics,
            method,
            true,
            "Product retrieved successfully",
        );

        Ok(ApiResponse {
            status: "success".into(),
            message: "Product retrieved successfully".into(),
            data: ProductResponse::from(product),
        })
    }
}
