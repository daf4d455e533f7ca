mod logs;
mod metrics;
mod otel;
mod random_string;
mod shutdown;

pub use self::logs::init_logger;
pub use self::metrics::{Method, Metrics, Status, SystemMetrics, run_metrics_collector};
pub use self::otel::{
    Telemetry, TelemetryProviders, TracingContext, complete_tracing, start_tracing,
};
pub use self::random_string::generate_random_code;
pub use self::shutdown::shutdown_signal;
