use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::AppState;

/// Operation key for balance lookups
pub const BALANCE_OPERATION: &str = "balance";
/// Operation key for the network listing
pub const NETWORKS_OPERATION: &str = "networks";
/// Operation key for the status report
pub const STATUS_OPERATION: &str = "status";
/// Operation key for the per-client HTTP limit
pub const HTTP_OPERATION: &str = "http";

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Default ceiling per (caller, operation) window
    pub max_requests: u32,
    pub window: Duration,
    pub cleanup_interval: Duration,
    /// Ceiling applied to every HTTP request per client
    pub http_max_requests: u32,
    pub http_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
            cleanup_interval: Duration::from_secs(5 * 60),
            http_max_requests: 100,
            http_window: Duration::from_secs(15 * 60),
        }
    }
}

impl From<&shared::config::RateLimitConfig> for RateLimitConfig {
    fn from(config: &shared::config::RateLimitConfig) -> Self {
        Self {
            max_requests: config.command_max_requests,
            window: Duration::from_millis(config.command_window_ms),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs),
            http_max_requests: config.http_max_requests,
            http_window: Duration::from_millis(config.http_window_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RateLimitKey {
    caller: String,
    operation: String,
}

impl RateLimitKey {
    fn new(caller: &str, operation: &str) -> Self {
        Self {
            caller: caller.to_string(),
            operation: operation.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    requests: u32,
    reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    fn fresh(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            requests: 1,
            reset_at: window_end(now, window),
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_at
    }
}

/// `now + window`, saturating at the last representable instant
fn window_end(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(window)
        .ok()
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Fixed-window request counter keyed by (caller, operation).
///
/// A window starts on the first request for a key and is discarded outright
/// once it has passed. The check-and-increment for a key happens under that
/// key's map entry lock, so concurrent requests for the same key can never
/// both be admitted past the ceiling.
pub struct RateLimiter {
    limits: DashMap<RateLimitKey, RateLimitEntry>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        info!(
            "Initializing rate limiter: {} requests per {:?}",
            config.max_requests, config.window
        );
        Self {
            limits: DashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and count a request using the configured ceiling and window
    pub fn is_rate_limited(&self, caller: &str, operation: &str) -> bool {
        self.check(caller, operation, self.config.max_requests, self.config.window)
    }

    /// Check and count a request. Returns `true` when the request is rejected.
    pub fn check(
        &self,
        caller: &str,
        operation: &str,
        max_requests: u32,
        window: Duration,
    ) -> bool {
        self.check_at(caller, operation, max_requests, window, Utc::now())
    }

    pub(crate) fn check_at(
        &self,
        caller: &str,
        operation: &str,
        max_requests: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        match self.limits.entry(RateLimitKey::new(caller, operation)) {
            Entry::Vacant(vacant) => {
                vacant.insert(RateLimitEntry::fresh(now, window));
                false
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();

                if entry.is_expired(now) {
                    *entry = RateLimitEntry::fresh(now, window);
                    return false;
                }

                if entry.requests >= max_requests {
                    warn!(
                        "Rate limit exceeded for user {} on command {}",
                        caller, operation
                    );
                    return true;
                }

                entry.requests += 1;
                false
            }
        }
    }

    /// Remaining requests against the configured default ceiling
    pub fn remaining_requests(&self, caller: &str, operation: &str) -> u32 {
        self.remaining_requests_for(caller, operation, self.config.max_requests)
    }

    /// Remaining requests against an explicit ceiling
    pub fn remaining_requests_for(&self, caller: &str, operation: &str, max_requests: u32) -> u32 {
        self.remaining_at(caller, operation, max_requests, Utc::now())
    }

    pub(crate) fn remaining_at(
        &self,
        caller: &str,
        operation: &str,
        max_requests: u32,
        now: DateTime<Utc>,
    ) -> u32 {
        match self.limits.get(&RateLimitKey::new(caller, operation)) {
            Some(entry) if !entry.is_expired(now) => max_requests.saturating_sub(entry.requests),
            _ => max_requests,
        }
    }

    /// When the current window for a key ends; one default window from now
    /// if the key has no entry
    pub fn reset_time(&self, caller: &str, operation: &str) -> DateTime<Utc> {
        self.limits
            .get(&RateLimitKey::new(caller, operation))
            .map(|entry| entry.reset_at)
            .unwrap_or_else(|| window_end(Utc::now(), self.config.window))
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Utc::now())
    }

    pub(crate) fn cleanup_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.limits.len();
        self.limits.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.limits.len());
        debug!("Rate limiter cleanup removed {} expired entries", removed);
        removed
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Run `cleanup` every `period` until the handle is aborted
    pub fn spawn_cleanup(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        info!("Starting rate limiter cleanup every {:?}", period);

        tokio::spawn(async move {
            let mut ticker = interval(period);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.cleanup();
            }
        })
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Rate-limit identity of a client: its peer IP, or "anonymous" when the
/// connection address is unknown. Request headers never take part.
pub fn caller_id(peer: Option<SocketAddr>) -> String {
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Per-client limit applied to every HTTP request
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let caller = caller_id(peer);

    let limiter = &state.rate_limiter;
    let config = limiter.config();

    if limiter.check(&caller, HTTP_OPERATION, config.http_max_requests, config.http_window) {
        warn!(
            "Rate limit exceeded for client {} on path {}",
            caller,
            req.uri().path()
        );
        return Err(ApiError::rate_limited(
            "Too many requests, please try again later.",
            limiter.reset_time(&caller, HTTP_OPERATION),
        ));
    }

    Ok(next.run(req).await)
}
