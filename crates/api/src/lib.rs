pub mod error;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod rate_limit;
pub mod routes;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use health::{HealthCheckService, HealthSnapshot};
pub use rate_limit::{RateLimitConfig, RateLimiter};

use blockchain::{
    AddressValidator, BalanceAggregator, BalanceFetcher, EvmAddressValidator, FanOut,
    NetworkStatusReporter, ProviderRegistry,
};
use std::sync::Arc;
use std::time::Instant;

/// Crate version reported by the service endpoints
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
    pub validator: Arc<dyn AddressValidator>,
    pub fetcher: Arc<BalanceFetcher>,
    pub aggregator: Arc<BalanceAggregator>,
    pub reporter: NetworkStatusReporter,
    pub rate_limiter: Arc<RateLimiter>,
    pub health: Arc<HealthCheckService>,
    pub environment: String,
    pub started_at: Instant,
}

impl AppState {
    /// Wire the balance services around an already built registry
    pub fn new(
        registry: Arc<ProviderRegistry>,
        fan_out: FanOut,
        rate_limit: RateLimitConfig,
        environment: impl Into<String>,
    ) -> Self {
        let validator: Arc<dyn AddressValidator> = Arc::new(EvmAddressValidator);
        let fetcher = Arc::new(BalanceFetcher::with_validator(
            registry.clone(),
            validator.clone(),
        ));
        let aggregator = Arc::new(BalanceAggregator::with_fan_out(fetcher.clone(), fan_out));
        let reporter = NetworkStatusReporter::new(registry.clone());
        let health = Arc::new(HealthCheckService::new(reporter.clone()));

        Self {
            registry,
            validator,
            fetcher,
            aggregator,
            reporter,
            rate_limiter: Arc::new(RateLimiter::new(rate_limit)),
            health,
            environment: environment.into(),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
