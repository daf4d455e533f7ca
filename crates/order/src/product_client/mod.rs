mod circuit_breaker;
mod http;

pub use self::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerProductClient, CircuitState,
    FALLBACK_PRODUCT_NAME, fallback_product,
};
pub use self::http::ProductHttpClient;
