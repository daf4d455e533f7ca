use crate::{
    abstract_trait::{
        cart::{DynCartRepository, DynCartService},
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::{DynOrderCommandService, DynOrderQueryService},
        },
        product_client::DynProductClient,
    },
    repository::{
        CartRepository, InMemoryCartRepository, InMemoryOrderRepository, OrderCommandRepository,
        OrderQueryRepository,
    },
    service::{
        CartService, CartServiceDeps, OrderCommandService, OrderCommandServiceDeps,
        OrderQueryService,
    },
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{abstract_trait::DynMessageBroker, config::ConnectionPool, events::EventBus};
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_command: DynOrderCommandService,
    pub order_query: DynOrderQueryService,
    pub cart_service: DynCartService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_command", &"OrderCommandService")
            .field("order_query", &"OrderQueryService")
            .field("cart_service", &"CartService")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub order_command_repo: DynOrderCommandRepository,
    pub order_query_repo: DynOrderQueryRepository,
    pub cart_repo: DynCartRepository,
    pub product_client: DynProductClient,
    pub broker: DynMessageBroker,
}

impl DependenciesInjectDeps {
    pub fn postgres(
        pool: ConnectionPool,
        product_client: DynProductClient,
        broker: DynMessageBroker,
    ) -> Self {
        Self {
            order_command_repo: Arc::new(OrderCommandRepository::new(pool.clone())),
            order_query_repo: Arc::new(OrderQueryRepository::new(pool.clone())),
            cart_repo: Arc::new(CartRepository::new(pool)),
            product_client,
            broker,
        }
    }

    pub fn in_memory(
        orders: InMemoryOrderRepository,
        carts: InMemoryCartRepository,
        product_client: DynProductClient,
        broker: DynMessageBroker,
    ) -> Self {
        Self {
            order_command_repo: Arc::new(orders.clone()),
            order_query_repo: Arc::new(orders),
            cart_repo: Arc::new(carts),
            product_client,
            broker,
        }
    }
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Result<Self> {
        let DependenciesInjectDeps {
            order_command_repo,
            order_query_repo,
            cart_repo,
            product_client,
            broker,
        } = deps;

        let order_command: DynOrderCommandService = Arc::new(
            OrderCommandService::new(
                OrderCommandServiceDeps {
                    product_client: product_client.clone(),
                    command: order_command_repo,
                    query: order_query_repo.clone(),
                    event_bus: EventBus::new(broker),
                },
                registry,
            )
            .context("failed initialize order command")?,
        );

        let order_query: DynOrderQueryService = Arc::new(
            OrderQueryService::new(order_query_repo, registry)
                .context("failed initialize order query")?,
        );

        let cart_service: DynCartService = Arc::new(
            CartService::new(
                CartServiceDeps {
                    carts: cart_repo,
                    product_client,
                    order_command: order_command.clone(),
                },
                registry,
            )
            .context("failed initialize cart service")?,
        );

        Ok(Self {
            order_command,
            order_query,
            cart_service,
        })
    }
}
