use anyhow::{Context, Result, anyhow};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ProductServiceConfig {
    pub base_url: String,
    pub lookup_timeout: Duration,
    pub failure_threshold: u32,
    pub open_duration: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub run_migrations: bool,
    pub port: u16,
    pub kafka_broker: String,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    pub product: ProductServiceConfig,
    pub otel_endpoint: String,
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("Unable to parse {name}, got '{value}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("Missing environment variable: DATABASE_URL")?;
        let run_migrations_str = std::env::var("RUN_MIGRATIONS")
            .context("Missing environment variable: RUN_MIGRATIONS")?;
        let port_str = std::env::var("PORT").context("Missing environment variable: PORT")?;

        let kafka_broker = std::env::var("KAFKA").context("Missing environment variable: KAFKA")?;

        let run_migrations = match run_migrations_str.as_str() {
            "true" => true,
            "false" => false,
            other => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let db_max_conn: u32 = env_or("DB_MAX_CONNECTION", 5)?;
        let db_min_conn: u32 = env_or("DB_MIN_CONNECTION", 1)?;

        let port = port_str
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        // product lookup
        let product_base_url = std::env::var("PRODUCT_SERVICE_URL")
            .context("Missing environment variable: PRODUCT_SERVICE_URL")?;
        let lookup_timeout_ms: u64 = env_or("PRODUCT_LOOKUP_TIMEOUT_MS", 3000)?;
        let failure_threshold: u32 = env_or("CIRCUIT_BREAKER_FAILURE_THRESHOLD", 5)?;
        let open_secs: u64 = env_or("CIRCUIT_BREAKER_OPEN_SECS", 30)?;

        if failure_threshold == 0 {
            return Err(anyhow!("CIRCUIT_BREAKER_FAILURE_THRESHOLD must be at least 1"));
        }

        let otel_endpoint = std::env::var("OTEL_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        Ok(Self {
            database_url,
            run_migrations,
            port,
            kafka_broker,
            db_max_conn,
            db_min_conn,
            product: ProductServiceConfig {
                base_url: product_base_url,
                lookup_timeout: Duration::from_millis(lookup_timeout_ms),
                failure_threshold,
                open_duration: Duration::from_secs(open_secs),
            },
            otel_endpoint,
        })
    }
}
