use crate::{
    abstract_trait::order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
    domain::response::order::OrderResponse,
};
use anyhow::Result;
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::responses::ApiResponse,
    errors::ServiceError,
    utils::{Method, Metrics, TracingContext, complete_tracing, start_tracing},
};
use tracing::info;

const TRACER: &str = "order-query-service";

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    metrics: Metrics,
}

impl OrderQueryService {
    pub fn new(query: DynOrderQueryRepository, registry: &mut Registry) -> Result<Self> {
        let metrics = Metrics::new();
        metrics.register("order_query_service", "OrderQueryService", registry);

        Ok(Self { query, metrics })
    }

    fn finish<T>(
        &self,
        tracing_ctx: &TracingContext,
        result: Result<T, ServiceError>,
        message: &str,
    ) -> Result<ApiResponse<T>, ServiceError> {
        match result {
            Ok(data) => {
                complete_tracing(tracing_ctx, &self.metrics, Method::Get, true, message);
                Ok(ApiResponse {
                    status: "success".into(),
                    message: message.into(),
                    data,
                })
            }
            Err(e) => {
                complete_tracing(
                    tracing_ctx,
                    &self.metrics,
                    Method::Get,
                    false,
                    &e.to_string(),
                );
                Err(e)
            }
        }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(&self) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        info!("📋 Listing all orders");

        let tracing_ctx = start_tracing(
            TRACER,
            "FindAllOrders",
            vec![KeyValue::new("component", "order")],
        );

        let result = self
            .query
            .find_all()
            .await
            .map(|orders| orders.into_iter().map(OrderResponse::from).collect())
            .map_err(ServiceError::from);

        self.finish(&tracing_ctx, result, "Orders retrieved successfully")
    }

    async fn find_by_id(&self, id: i64) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🔍 Fetching order by ID: {}", id);

        let tracing_ctx = start_tracing(
            TRACER,
            "FindOrderById",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id),
            ],
        );

        let result = match self.query.find_by_id(id).await {
            Ok(Some(order)) => Ok(OrderResponse::from(order)),
            Ok(None) => Err(ServiceError::NotFound(format!(
                "Order with id {id} not found"
            ))),
            Err(e) => Err(ServiceError::from(e)),
        };

        self.finish(&tracing_ctx, result, "Order retrieved successfully")
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🔍 Fetching order by number: {}", order_number);

        let tracing_ctx = start_tracing(
            TRACER,
            "FindOrderByNumber",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.number", order_number.to_string()),
            ],
        );

        let result = match self.query.find_by_order_number(order_number).await {
            Ok(Some(order)) => Ok(OrderResponse::from(order)),
            Ok(None) => Err(ServiceError::NotFound(format!(
                "Order with number {order_number} not found"
            ))),
            Err(e) => Err(ServiceError::from(e)),
        };

        self.finish(&tracing_ctx, result, "Order retrieved successfully")
    }

    async fn find_by_customer(
        &self,
        customer_id: i64,
    ) -> Result<ApiResponse<Vec<OrderResponse>>, ServiceError> {
        info!("👤 Fetching orders of customer {}", customer_id);

        let tracing_ctx = start_tracing(
            TRACER,
            "FindOrdersByCustomer",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.customer_id", customer_id),
            ],
        );

        let result = self
            .query
            .find_by_customer(customer_id)
            .await
            .map(|orders| orders.into_iter().map(OrderResponse::from).collect())
            .map_err(ServiceError::from);

        self.finish(&tracing_ctx, result, "Orders retrieved successfully")
    }
}
