use crate::{
    abstract_trait::{
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::OrderCommandServiceTrait,
        },
        product_client::DynProductClient,
    },
    domain::{
        requests::order::{
            CreateOrderItemRecordRequest, CreateOrderRecordRequest, CreateOrderRequest,
            UpdateOrderStatusRequest,
        },
        response::order::OrderResponse,
    },
    model::order::{OrderStatus, OrderWithItems},
};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::{
        event::{
            ORDER_CREATED_TOPIC, OrderCreatedEvent, STOCK_UPDATE_TOPIC, StockAdjustmentEvent,
            StockOperation,
        },
        responses::{ApiResponse, ProductResponse},
    },
    errors::ServiceError,
    events::EventBus,
    utils::{Method, Metrics, complete_tracing, generate_random_code, start_tracing},
};
use std::collections::HashMap;
use tracing::{error, info, warn};
use validator::Validate;

const TRACER: &str = "order-command-service";

pub struct OrderCommandServiceDeps {
    pub product_client: DynProductClient,
    pub command: DynOrderCommandRepository,
    pub query: DynOrderQueryRepository,
    pub event_bus: EventBus,
}

#[derive(Clone)]
pub struct OrderCommandService {
    product_client: DynProductClient,
    command: DynOrderCommandRepository,
    query: DynOrderQueryRepository,
    event_bus: EventBus,
    metrics: Metrics,
}

impl OrderCommandService {
    pub fn new(deps: OrderCommandServiceDeps, registry: &mut Registry) -> Result<Self> {
        let OrderCommandServiceDeps {
            product_client,
            command,
            query,
            event_bus,
        } = deps;

        let metrics = Metrics::new();
        metrics.register("order_command_service", "OrderCommandService", registry);

        Ok(Self {
            product_client,
            command,
            query,
            event_bus,
            metrics,
        })
    }

    fn generate_order_number() -> Result<String, ServiceError> {
        let suffix = generate_random_code(8)
            .map_err(|e| ServiceError::Internal(format!("Failed to generate order number: {e}")))?;

        Ok(format!(
            "ORD-{}-{}",
            Utc::now().format("%Y%m%d%H%M%S"),
            suffix
        ))
    }

    async fn lookup_products(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<HashMap<i64, ProductResponse>, ServiceError> {
        let mut products = HashMap::new();

        for item in &req.items {
            if products.contains_key(&item.product_id) {
                continue;
            }
            let product = self.product_client.find_by_id(item.product_id).await?;
            products.insert(item.product_id, product);
        }

        Ok(products)
    }

    fn check_availability(
        req: &CreateOrderRequest,
        products: &HashMap<i64, ProductResponse>,
    ) -> Result<(), ServiceError> {
        let mut requested: Vec<(i64, i32)> = Vec::new();
        for item in &req.items {
            match requested.iter_mut().find(|(id, _)| *id == item.product_id) {
                Some((_, qty)) => {
                    *qty = qty.checked_add(item.quantity).ok_or_else(|| {
                        ServiceError::validation(format!(
                            "quantity overflow for product {}",
                            item.product_id
                        ))
                    })?;
                }
                None => requested.push((item.product_id, item.quantity)),
            }
        }

        for (product_id, qty) in requested {
            let product = products.get(&product_id).ok_or_else(|| {
                ServiceError::Internal(format!("product {product_id} missing from lookup"))
            })?;

            if qty > product.stock_quantity {
                return Err(ServiceError::InsufficientStock {
                    product_id,
                    requested: qty,
                    available: product.stock_quantity,
                });
            }

            if !product.active {
                return Err(ServiceError::validation(format!(
                    "product {product_id} is not available for ordering"
                )));
            }
        }

        Ok(())
    }

    fn price_items(
        req: &CreateOrderRequest,
        products: &HashMap<i64, ProductResponse>,
    ) -> Result<(Vec<CreateOrderItemRecordRequest>, i64), ServiceError> {
        let overflow = || ServiceError::validation("order total exceeds the supported range");

        let mut total_amount: i64 = 0;
        let mut items = Vec::with_capacity(req.items.len());

        for item in &req.items {
            let price = products
                .get(&item.product_id)
                .map(|p| p.price)
                .ok_or_else(|| {
                    ServiceError::Internal(format!(
                        "product {} missing from lookup",
                        item.product_id
                    ))
                })?;

            let subtotal = price
                .checked_mul(item.quantity as i64)
                .ok_or_else(overflow)?;
            total_amount = total_amount.checked_add(subtotal).ok_or_else(overflow)?;

            items.push(CreateOrderItemRecordRequest {
                product_id: item.product_id,
                quantity: item.quantity,
                price_at_purchase: price,
                subtotal,
            });
        }

        Ok((items, total_amount))
    }

    async fn publish_stock_events(&self, order: &OrderWithItems, operation: StockOperation) {
        for item in &order.items {
            let event = match operation {
                StockOperation::Reserve => {
                    StockAdjustmentEvent::reserve(item.product_id, item.quantity)
                }
                StockOperation::Release => {
                    StockAdjustmentEvent::release(item.product_id, item.quantity)
                }
            }
            .with_idempotency_key(format!(
                "{}:{}:{}",
                order.order.order_number, item.order_item_id, operation
            ));

            if let Err(e) = self
                .event_bus
                .publish(STOCK_UPDATE_TOPIC, &item.product_id.to_string(), &event)
                .await
            {
                error!(
                    order_number = %order.order.order_number,
                    product_id = item.product_id,
                    %operation,
                    "❌ Failed to publish stock event: {e}"
                );
            }
        }
    }

    async fn load_order(&self, id: i64) -> Result<OrderWithItems, ServiceError> {
        self.query
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order with id {id} not found")))
    }

    async fn transition(
        &self,
        order: &OrderWithItems,
        next: OrderStatus,
    ) -> Result<OrderWithItems, ServiceError> {
        let current = order.order.status()?;

        if !current.can_transition_to(next) {
            return Err(ServiceError::InvalidState(format!(
                "Order {} is {} and cannot change to {}",
                order.order.order_number, current, next
            )));
        }

        self.command
            .transition_status(order.order.order_id, next)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidState(format!(
                    "Order {} was closed concurrently",
                    order.order.order_number
                ))
            })
    }

    async fn create_order_inner(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<OrderWithItems, ServiceError> {
        req.validate()?;

        let products = self.lookup_products(req).await?;
        Self::check_availability(req, &products)?;
        let (items, total_amount) = Self::price_items(req, &products)?;

        let record = CreateOrderRecordRequest {
            order_number: Self::generate_order_number()?,
            customer_id: req.customer_id,
            total_amount,
            status: OrderStatus::Pending,
            shipping_address: req.shipping_address.clone(),
            items,
        };

        let order = self.command.create_order(&record).await?;

        info!(
            order_number = %order.order.order_number,
            total_amount,
            "🧾 Order persisted, emitting reservations"
        );

        self.publish_stock_events(&order, StockOperation::Reserve)
            .await;

        let created = OrderCreatedEvent {
            order_id: order.order.order_id,
            order_number: order.order.order_number.clone(),
            customer_id: order.order.customer_id,
        };
        if let Err(e) = self
            .event_bus
            .publish(ORDER_CREATED_TOPIC, &created.order_number, &created)
            .await
        {
            error!(order_number = %created.order_number, "❌ Failed to publish order.created: {e}");
        }

        Ok(order)
    }

    async fn cancel_order_inner(&self, id: i64) -> Result<OrderWithItems, ServiceError> {
        let order = self.load_order(id).await?;
        let cancelled = self.transition(&order, OrderStatus::Cancelled).await?;

        info!(
            order_number = %cancelled.order.order_number,
            "↩️ Order cancelled, releasing reserved stock"
        );

        self.publish_stock_events(&cancelled, StockOperation::Release)
            .await;

        Ok(cancelled)
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(
        &self,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🏗️ Creating new order for customer_id={}", req.customer_id);

        let method = Method::Post;
        let tracing_ctx = start_tracing(
            TRACER,
            "CreateOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.customer_id", req.customer_id),
                KeyValue::new("order.items", req.items.len() as i64),
            ],
        );

        match self.create_order_inner(req).await {
            Ok(order) => {
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    true,
                    "Order created successfully",
                );
                Ok(ApiResponse {
                    status: "success".into(),
                    message: "Order created successfully".into(),
                    data: OrderResponse::from(order),
                })
            }
            Err(e) => {
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    false,
                    &format!("Failed to create order: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn cancel_order(&self, id: i64) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        info!("🛑 Cancelling order ID={}", id);

        let method = Method::Delete;
        let tracing_ctx = start_tracing(
            TRACER,
            "CancelOrder",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id),
            ],
        );

        match self.cancel_order_inner(id).await {
            Ok(order) => {
                complete_tracing(&tracing_ctx, &self.metrics, method, true, "Order cancelled");
                Ok(ApiResponse {
                    status: "success".into(),
                    message: "Order cancelled successfully".into(),
                    data: OrderResponse::from(order),
                })
            }
            Err(e) => {
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    false,
                    &format!("Failed to cancel order: {e}"),
                );
                Err(e)
            }
        }
    }

    async fn update_order_status(
        &self,
        id: i64,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let next: OrderStatus = req.status.parse()?;

        if next == OrderStatus::Cancelled {
            return self.cancel_order(id).await;
        }

        info!("✏️ Updating status of order ID={} to {}", id, next);

        let method = Method::Patch;
        let tracing_ctx = start_tracing(
            TRACER,
            "UpdateOrderStatus",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id),
                KeyValue::new("order.status", next.as_str()),
            ],
        );

        let result = async {
            let order = self.load_order(id).await?;
            self.transition(&order, next).await
        }
        .await;

        match result {
            Ok(order) => {
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    true,
                    "Order status updated",
                );
                Ok(ApiResponse {
                    status: "success".into(),
                    message: "Order status updated successfully".into(),
                    data: OrderResponse::from(order),
                })
            }
            Err(e) => {
                warn!("⚠️ Status update of order {} refused: {}", id, e);
                complete_tracing(
                    &tracing_ctx,
                    &self.metrics,
                    method,
                    false,
                    &format!("Failed to update order status: {e}"),
                );
                Err(e)
            }
        }
    }
}
