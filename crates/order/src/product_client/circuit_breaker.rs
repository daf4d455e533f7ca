use crate::abstract_trait::product_client::{DynProductClient, ProductClientTrait};
use async_trait::async_trait;
use shared::{domain::responses::ProductResponse, errors::ServiceError};
use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use tracing::{info, warn};

pub const FALLBACK_PRODUCT_NAME: &str = "Product Unavailable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Copy)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_duration: Duration,
    pub call_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(30),
            call_timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    trial_started: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                trial_started: None,
            }),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open_elapsed(&self, inner: &BreakerState) -> bool {
        inner
            .opened_at
            .is_none_or(|at| at.elapsed() >= self.config.open_duration)
    }

    pub fn state(&self) -> CircuitState {
        let inner = self.lock();
        match inner.state {
            CircuitState::Open if self.open_elapsed(&inner) => CircuitState::HalfOpen,
            state => state,
        }
    }

    pub fn try_acquire(&self) -> bool {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                if self.open_elapsed(&inner) {
                    info!("Circuit half-open, letting a trial call through");
                    inner.state = CircuitState::HalfOpen;
                    inner.trial_started = Some(Instant::now());
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => {
                // A trial that outlived the call timeout was abandoned by its caller.
                let trial_pending = inner
                    .trial_started
                    .is_some_and(|at| at.elapsed() < self.config.call_timeout);
                if trial_pending {
                    false
                } else {
                    inner.trial_started = Some(Instant::now());
                    true
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();

        if inner.state != CircuitState::Closed {
            info!("✅ Circuit closed");
        }

        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
        inner.trial_started = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();

        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                if inner.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        failures = inner.consecutive_failures,
                        "⚠️ Circuit opened after consecutive failures"
                    );
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen | CircuitState::Open => {
                warn!("⚠️ Trial call failed, circuit reopened");
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.trial_started = None;
            }
        }
    }
}

pub fn fallback_product(id: i64) -> ProductResponse {
    ProductResponse {
        id,
        name: FALLBACK_PRODUCT_NAME.to_string(),
        price: 0,
        stock_quantity: 0,
        active: false,
    }
}

/// A not-found answer counts as a success.
pub struct CircuitBreakerProductClient {
    inner: DynProductClient,
    breaker: CircuitBreaker,
}

impl CircuitBreakerProductClient {
    pub fn new(inner: DynProductClient, config: CircuitBreakerConfig) -> Self {
        Self {
            inner,
            breaker: CircuitBreaker::new(config),
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }
}

#[async_trait]
impl ProductClientTrait for CircuitBreakerProductClient {
    async fn find_by_id(&self, id: i64) -> Result<ProductResponse, ServiceError> {
        if !self.breaker.try_acquire() {
            warn!(product_id = id, "Circuit open, serving fallback product");
            return Ok(fallback_product(id));
        }

        let call_timeout = self.breaker.config().call_timeout;

        match tokio::time::timeout(call_timeout, self.inner.find_by_id(id)).await {
            Ok(Ok(product)) => {
                self.breaker.record_success();
                Ok(product)
            }
            Ok(Err(e)) if e.is_not_found() => {
                self.breaker.record_success();
                Err(e)
            }
            Ok(Err(e)) => {
                self.breaker.record_failure();
                Err(e)
            }
            Err(_) => {
                self.breaker.record_failure();
                Err(ServiceError::DependencyUnavailable(format!(
                    "product lookup for id {id} timed out after {call_timeout:?}"
                )))
            }
        }
    }
}
