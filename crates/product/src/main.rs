use anyhow::{Context, Result};
use product::{
    config::myconfig::Config,
    di::DependenciesInjectDeps,
    handler::AppRouter,
    messaging::{ConsumerExit, StockEventConsumer},
    state::AppState,
};
use shared::{
    abstract_trait::{DynMessageBroker, DynMessageHandler},
    config::{ConnectionManager, ConnectionPool, Kafka},
    utils::{Telemetry, TelemetryProviders, init_logger},
};
use std::sync::Arc;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

struct Runtime {
    config: Config,
    state: Arc<AppState>,
    broker: DynMessageBroker,
    telemetry: TelemetryProviders,
    _log_guard: Option<WorkerGuard>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let runtime = setup().await.context("Failed to setup application")?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let consumer_handle = spawn_stock_consumer(
        runtime.broker.clone(),
        runtime.state.di_container.stock_handler.clone(),
        runtime.config.consumer_group.clone(),
        shutdown_tx.clone(),
    );

    let server_result = AppRouter::serve(runtime.config.port, runtime.state.clone()).await;

    if let Err(e) = shutdown_tx.send(()) {
        warn!("Failed to broadcast shutdown: {e}");
    }

    shutdown(runtime.telemetry, consumer_handle).await;

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

    let telemetry = Telemetry::new("product-service", config.otel_endpoint.clone())
        .init()
        .context("Failed to initialize telemetry")?;

    let log_guard = init_logger(&telemetry.logger, "product-service", is_dev, is_enable_file);

    info!("🚀 Starting Product Service initialization...");

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

    let deps = DependenciesInjectDeps::postgres(db_pool, config.deduplicate_stock_events);
    let state = Arc::new(AppState::new(deps).context("Failed to create AppState")?);

    info!("✅ Application setup completed successfully.");

    Ok(Runtime {
        config,
        state,
        broker,
        telemetry,
        _log_guard: log_guard,
    })
}

fn spawn_stock_consumer(
    broker: DynMessageBroker,
    handler: DynMessageHandler,
    group_id: String,
    shutdown_tx: broadcast::Sender<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        loop {
            info!("🔄 Starting stock event consumer...");

            let consumer = StockEventConsumer::new(broker.clone(), handler.clone(), &group_id);

            match consumer.run_until_shutdown(&mut shutdown_rx).await {
                Ok(ConsumerExit::Shutdown) => break,
                Ok(ConsumerExit::Finished) => warn!("Stock consumer exited. Restarting in 5s..."),
                Err(e) => error!("💀 Stock consumer error: {e}. Restarting in 5s..."),
            }

            tokio::select! {
                _ = tokio::time::sleep(tokio::time::Duration::from_secs(5)) => {}
                _ = shutdown_rx.recv() => break,
            }
        }
    })
}

async fn shutdown(telemetry: TelemetryProviders, consumer_handle: JoinHandle<()>) {
    info!("🛑 Shutting down product service...");

    let shutdown_timeout = tokio::time::Duration::from_secs(30);
    match tokio::time::timeout(shutdown_timeout, consumer_handle).await {
        Ok(_) => info!("✅ All components shutdown gracefully"),
        Err(_) => warn!("⚠️ Shutdown timeout reached, forcing exit"),
    }

    if let Err(e) = telemetry.shutdown() {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Product Service shutdown complete.");
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
