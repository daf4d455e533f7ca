use crate::{
    abstract_trait::{
        processed_event::DynProcessedEventRepository,
        product::{
            repository::{DynProductCommandRepository, DynProductQueryRepository},
            service::{DynProductCommandService, DynProductQueryService},
        },
    },
    messaging::{StockAdjustmentHandler, StockAdjustmentHandlerDeps},
    metrics::StockMetrics,
    repository::{
        InMemoryProcessedEventRepository, InMemoryProductRepository, ProcessedEventRepository,
        ProductCommandRepository, ProductQueryRepository,
    },
    service::{ProductCommandService, ProductCommandServiceDeps, ProductQueryService},
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::{fmt, sync::Arc};

#[derive(Clone)]
pub struct DependenciesInject {
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
    pub stock_handler: Arc<StockAdjustmentHandler>,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("product_query", &"ProductQueryService")
            .field("product_command", &"ProductCommandService")
            .field("stock_handler", &"StockAdjustmentHandler")
            .finish()
    }
}

#[derive(Clone)]
pub struct DependenciesInjectDeps {
    pub query_repo: DynProductQueryRepository,
    pub command_repo: DynProductCommandRepository,
    pub processed_events: Option<DynProcessedEventRepository>,
}

impl DependenciesInjectDeps {
    pub fn postgres(pool: ConnectionPool, deduplicate: bool) -> Self {
        let processed_events = deduplicate.then(|| {
            Arc::new(ProcessedEventRepository::new(pool.clone())) as DynProcessedEventRepository
        });

        Self {
            query_repo: Arc::new(ProductQueryRepository::new(pool.clone())),
            command_repo: Arc::new(ProductCommandRepository::new(pool)),
            processed_events,
        }
    }

    pub fn in_memory(store: InMemoryProductRepository, deduplicate: bool) -> Self {
        let processed_events = deduplicate.then(|| {
            Arc::new(InMemoryProcessedEventRepository::new()) as DynProcessedEventRepository
        });

        Self {
            query_repo: Arc::new(store.clone()),
            command_repo: Arc::new(store),
            processed_events,
        }
    }
}

impl DependenciesInject {
    pub fn new(deps: DependenciesInjectDeps, registry: &mut Registry) -> Result<Self> {
        let DependenciesInjectDeps {
            query_repo,
            command_repo,
            processed_events,
        } = deps;

        let product_query: DynProductQueryService = Arc::new(
            ProductQueryService::new(query_repo.clone(), registry)
                .context("failed initialize product query")?,
        );

        let product_command: DynProductCommandService = Arc::new(
            ProductCommandService::new(
                ProductCommandServiceDeps {
                    query: query_repo,
                    command: command_repo,
                },
                registry,
            )
            .context("failed initialize product command")?,
        );

        let stock_metrics = StockMetrics::new();
        stock_metrics.register(registry);

        let stock_handler = Arc::new(StockAdjustmentHandler::new(StockAdjustmentHandlerDeps {
            product_command: product_command.clone(),
            processed_events,
            metrics: stock_metrics,
        }));

        Ok(Self {
            product_query,
            product_command,
            stock_handler,
        })
    }
}
