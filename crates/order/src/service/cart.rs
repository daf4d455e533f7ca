use crate::{
    abstract_trait::{
        cart::{CartLock, CartServiceTrait, DynCartRepository},
        order::service::DynOrderCommandService,
        product_client::DynProductClient,
    },
    domain::{
        requests::{
            cart::{AddCartItemRequest, CheckoutRequest, UpdateCartItemRequest},
            order::{CreateOrderItemRequest, CreateOrderRequest},
        },
        response::{
            cart::{CartItemResponse, CartResponse},
            order::OrderResponse,
        },
    },
    model::cart::Cart,
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
use tracing::{debug, error, info};
use validator::Validate;

const TRACER: &str = "cart-service";

pub struct CartServiceDeps {
    pub carts: DynCartRepository,
    pub product_client: DynProductClient,
    pub order_command: DynOrderCommandService,
}

#[derive(Clone)]
pub struct CartService {
    carts: DynCartRepository,
    product_client: DynProductClient,
    order_command: DynOrderCommandService,
    metrics: Metrics,
}

impl CartService {
    pub fn new(deps: CartServiceDeps, registry: &mut Registry) -> Result<Self> {
        let CartServiceDeps {
            carts,
            product_client,
            order_command,
        } = deps;

        let metrics = Metrics::new();
        metrics.register("cart_service", "CartService", registry);

        Ok(Self {
            carts,
            product_client,
            order_command,
            metrics,
        })
    }

    async fn lock_or_create(&self, user_id: i64) -> Result<(Cart, CartLock), ServiceError> {
        self.carts.lock(user_id, true).await?.ok_or_else(|| {
            ServiceError::Internal(format!("Cart of user {user_id} could not be created"))
        })
    }

    async fn lock_existing(&self, user_id: i64) -> Result<(Cart, CartLock), ServiceError> {
        self.carts
            .lock(user_id, false)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart not found for user {user_id}")))
    }

    async fn get_or_create(&self, user_id: i64) -> Result<Cart, ServiceError> {
        if let Some(cart) = self.carts.find_by_user(user_id).await? {
            return Ok(cart);
        }

        info!("🛒 Creating cart for user {}", user_id);
        let (cart, lock) = self.lock_or_create(user_id).await?;
        lock.save(&cart).await?;
        Ok(cart)
    }

    async fn to_response(&self, cart: &Cart) -> CartResponse {
        let mut items = Vec::with_capacity(cart.items().len());

        for item in cart.items() {
            let product_name = match self.product_client.find_by_id(item.product_id).await {
                Ok(product) => Some(product.name),
                Err(e) => {
                    debug!(product_id = item.product_id, "Cart line without product data: {e}");
                    None
                }
            };

            items.push(CartItemResponse {
                product_id: item.product_id,
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.subtotal(),
            });
        }

        CartResponse {
            user_id: cart.user_id(),
            items,
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }

    async fn respond(
        &self,
        tracing_ctx: TracingContext,
        method: Method,
        result: Result<Cart, ServiceError>,
        message: &str,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        match result {
            Ok(cart) => {
                complete_tracing(&tracing_ctx, &self.metrics, method, true, message);
                Ok(ApiResponse {
                    status: "success".into(),
                    message: message.into(),
                    data: self.to_response(&cart).await,
                })
            }
            Err(e) => {
                complete_tracing(&tracing_ctx, &self.metrics, method, false, &e.to_string());
                Err(e)
            }
        }
    }

    async fn add_item_inner(
        &self,
        user_id: i64,
        req: &AddCartItemRequest,
    ) -> Result<Cart, ServiceError> {
        req.validate()?;

        let product = self.product_client.find_by_id(req.product_id).await?;
        if !product.active {
            return Err(ServiceError::validation(format!(
                "product {} is not available",
                req.product_id
            )));
        }

        let (mut cart, lock) = self.lock_or_create(user_id).await?;
        cart.add_item(req.product_id, req.quantity, product.price)?;
        lock.save(&cart).await?;

        info!("➕ Added product {} to cart of user {}", req.product_id, user_id);
        Ok(cart)
    }

    async fn update_item_inner(
        &self,
        user_id: i64,
        req: &UpdateCartItemRequest,
    ) -> Result<Cart, ServiceError> {
        req.validate()?;

        let (mut cart, lock) = self.lock_existing(user_id).await?;
        if !cart.update_quantity(req.product_id, req.quantity)? {
            return Err(ServiceError::NotFound(format!(
                "Product {} is not in the cart",
                req.product_id
            )));
        }
        lock.save(&cart).await?;

        info!("✏️ Updated product {} in cart of user {}", req.product_id, user_id);
        Ok(cart)
    }

    async fn remove_item_inner(&self, user_id: i64, product_id: i64) -> Result<Cart, ServiceError> {
        let (mut cart, lock) = self.lock_existing(user_id).await?;
        if !cart.remove_item(product_id) {
            return Err(ServiceError::NotFound(format!(
                "Product {product_id} is not in the cart"
            )));
        }
        lock.save(&cart).await?;

        info!("➖ Removed product {} from cart of user {}", product_id, user_id);
        Ok(cart)
    }

    async fn clear_inner(&self, user_id: i64) -> Result<Cart, ServiceError> {
        let (mut cart, lock) = self.lock_existing(user_id).await?;
        cart.clear();
        lock.save(&cart).await?;

        info!("🧹 Cleared cart of user {}", user_id);
        Ok(cart)
    }

    async fn checkout_inner(
        &self,
        user_id: i64,
        req: &CheckoutRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        req.validate()?;

        let (mut cart, lock) = self.lock_existing(user_id).await?;
        if cart.is_empty() {
            return Err(ServiceError::validation("cart is empty"));
        }

        let order_request = CreateOrderRequest {
            customer_id: user_id,
            items: cart
                .items()
                .iter()
                .map(|item| CreateOrderItemRequest {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            shipping_address: req.shipping_address.clone(),
        };

        let order = self.order_command.create_order(&order_request).await?;

        cart.clear();
        if let Err(e) = lock.save(&cart).await {
            error!(
                "⚠️ Order {} was created but the cart of user {} was not cleared: {}",
                order.data.order_number, user_id, e
            );
        }

        info!(
            "💳 Checked out cart of user {} into order {}",
            user_id, order.data.order_number
        );

        Ok(order)
    }
}

#[async_trait]
impl CartServiceTrait for CartService {
    async fn get_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = start_tracing(
            TRACER,
            "GetCart",
            vec![KeyValue::new("cart.user_id", user_id)],
        );

        let result = self.get_or_create(user_id).await;
        self.respond(tracing_ctx, Method::Get, result, "Cart retrieved successfully")
            .await
    }

    async fn add_item(
        &self,
        user_id: i64,
        req: &AddCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = start_tracing(
            TRACER,
            "AddCartItem",
            vec![
                KeyValue::new("cart.user_id", user_id),
                KeyValue::new("product.id", req.product_id),
            ],
        );

        let result = self.add_item_inner(user_id, req).await;
        self.respond(tracing_ctx, Method::Post, result, "Item added to cart")
            .await
    }

    async fn update_item(
        &self,
        user_id: i64,
        req: &UpdateCartItemRequest,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = start_tracing(
            TRACER,
            "UpdateCartItem",
            vec![
                KeyValue::new("cart.user_id", user_id),
                KeyValue::new("product.id", req.product_id),
            ],
        );

        let result = self.update_item_inner(user_id, req).await;
        self.respond(tracing_ctx, Method::Put, result, "Cart item updated")
            .await
    }

    async fn remove_item(
        &self,
        user_id: i64,
        product_id: i64,
    ) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = start_tracing(
            TRACER,
            "RemoveCartItem",
            vec![
                KeyValue::new("cart.user_id", user_id),
                KeyValue::new("product.id", product_id),
            ],
        );

        let result = self.remove_item_inner(user_id, product_id).await;
        self.respond(tracing_ctx, Method::Delete, result, "Item removed from cart")
            .await
    }

    async fn clear_cart(&self, user_id: i64) -> Result<ApiResponse<CartResponse>, ServiceError> {
        let tracing_ctx = start_tracing(
            TRACER,
            "ClearCart",
            vec![KeyValue::new("cart.user_id", user_id)],
        );

        let result = self.clear_inner(user_id).await;
        self.respond(tracing_ctx, Method::Delete, result, "Cart cleared")
            .await
    }

    async fn checkout(
        &self,
        user_id: i64,
        req: &CheckoutRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let tracing_ctx = start_tracing(
            TRACER,
            "Checkout",
            vec![KeyValue::new("cart.user_id", user_id)],
        );

        let result = self.checkout_inner(user_id, req).await;
        match &result {
            Ok(order) => complete_tracing(
                &tracing_ctx,
                &self.metrics,
                Method::Post,
                true,
                &format!("Cart checked out into order {}", order.data.order_number),
            ),
            Err(e) => complete_tracing(
                &tracing_ctx,
                &self.metrics,
                Method::Post,
                false,
                &e.to_string(),
            ),
        }

        result
    }
}
