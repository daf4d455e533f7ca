use anyhow::{Context, Result};
use order::{
    abstract_trait::product_client::DynProductClient,
    config::myconfig::{Config, ProductServiceConfig},
    di::DependenciesInjectDeps,
    handler::AppRouter,
    product_client::{CircuitBreakerConfig, CircuitBreakerProductClient, ProductHttpClient},
    state::AppState,
};
use shared::{
    abstract_trait::DynMessageBroker,
    config::{ConnectionManager, ConnectionPool, Kafka},
    utils::{Telemetry, TelemetryProviders, init_logger},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

struct Runtime {
    config: Config,
    state: Arc<AppState>,
    telemetry: TelemetryProviders,
    _log_guard: Option<WorkerGuard>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = setup().await.context("Failed to setup application")?;

    let server_result = AppRouter::serve(runtime.config.port, runtime.state.clone()).await;

    info!("🛑 Shutting down order service...");

    if let Err(e) = runtime.telemetry.shutdown() {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Order Service shutdown complete.");

    server_result.context("HTTP server failed")
}

async fn setup() -> Result<Runtime> {
    dotenv::dotenv().ok();

    let is_dev = std::env::var("DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    let is_enable_file = std::env::var("ENABLE_FILE_LOG")
        .map(|v| v == "true")
        .unwrap_or(false);

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::new("order-service", config.otel_endpoint.clone())
        .init()
        .context("Failed to initialize telemetry")?;

    let log_guard = init_logger(&telemetry.logger, "order-service", is_dev, is_enable_file);

    info!("🚀 Starting Order Service initialization...");

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let broker: DynMessageBroker =
        Arc::new(Kafka::new(&config.kafka_broker).context("Failed to connect to Kafka")?);

    let product_client =
        product_client(&config.product).context("Failed to build product client")?;

    let deps = DependenciesInjectDeps::postgres(db_pool, product_client, broker);
    let state = Arc::new(AppState::new(deps).context("Failed to create AppState")?);

    info!("✅ Application setup completed successfully.");

    Ok(Runtime {
        config,
        state,
        telemetry,
        _log_guard: log_guard,
    })
}

fn product_client(config: &ProductServiceConfig) -> Result<DynProductClient> {
    let http = ProductHttpClient::new(config.base_url.clone(), config.lookup_timeout)?;

    info!(
        "🔌 Product lookups via {} (breaker opens after {} failures for {:?})",
        config.base_url, config.failure_threshold, config.open_duration
    );

    Ok(Arc::new(CircuitBreakerProductClient::new(
        Arc::new(http),
        CircuitBreakerConfig {
            failure_threshold: config.failure_threshold,
            open_duration: config.open_duration,
            call_timeout: config.lookup_timeout,
        },
    )))
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
