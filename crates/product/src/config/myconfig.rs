use anyhow::{Context, Result, anyhow};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub run_migrations: bool,
    pub port: u16,
    pub kafka_broker: String,
    pub db_max_conn: u32,
    pub db_min_conn: u32,
    pub consumer_group: String,
    pub deduplicate_stock_events: bool,
    pub otel_endpoint: String,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(anyhow!("{name} must be 'true' or 'false', got '{other}'")),
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

        let run_migrations = parse_bool("RUN_MIGRATIONS", &run_migrations_str)?;

        let port = port_str
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let db_max_conn = std::env::var("DB_MAX_CONNECTION")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTION must be a valid u32 integer")?;

        let db_min_conn = std::env::var("DB_MIN_CONNECTION")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .context("DB_MIN_CONNECTION must be a valid u32 integer")?;

        let consumer_group = std::env::var("STOCK_CONSUMER_GROUP")
            .unwrap_or_else(|_| "product-service-group".to_string());

        let deduplicate_stock_events = match std::env::var("STOCK_DEDUPLICATION") {
            Ok(value) => parse_bool("STOCK_DEDUPLICATION", &value)?,
            Err(_) => false,
        };

        let otel_endpoint = std::env::var("OTEL_ENDPOINT")
            .unwrap_or_else(|_| "http://otel-collector:4317".to_string());

        Ok(Self {
            database_url,
            run_migrations,
            port,
            kafka_broker,
            db_max_conn,
            db_min_conn,
            consumer_group,
            deduplicate_stock_events,
            otel_endpoint,
        })
    }
}
