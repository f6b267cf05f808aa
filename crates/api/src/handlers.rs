use axum::{
    extract::{ConnectInfo, Path, State},
    http::Uri,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use shared::{AggregateResult, SupportedNetwork};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::rate_limit::{caller_id, BALANCE_OPERATION, NETWORKS_OPERATION, STATUS_OPERATION};
use crate::{AppState, VERSION};

// Response types
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Service descriptor
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Web3 Balance Bot",
        "version": VERSION,
        "status": "running",
        "endpoints": {
            "health": "/health",
            "status": "/status",
            "networks": "/api/networks",
            "balances": "/api/balances/:address",
        }
    }))
}

/// Liveness check
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_secs": state.uptime_secs(),
        "version": VERSION,
    }))
}

/// Connectivity and environment details
pub async fn status(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ApiResult<Json<serde_json::Value>> {
    enforce_operation_limit(&state, STATUS_OPERATION, connect_info)?;

    let networks = state.reporter.snapshot().await;
    let health = state.health.health_status().await;

    Ok(Json(serde_json::json!({
        "service": {
            "status": "running",
            "uptime_secs": state.uptime_secs(),
            "version": VERSION,
        },
        "networks": networks,
        "connected_networks": state.reporter.connected_count().await,
        "healthy": state.health.is_healthy().await,
        "last_check": health.last_check.to_rfc3339(),
        "environment": state.environment,
        "version": VERSION,
    })))
}

pub async fn list_networks(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ApiResult<Json<ApiResponse<Vec<SupportedNetwork>>>> {
    enforce_operation_limit(&state, NETWORKS_OPERATION, connect_info)?;

    Ok(Json(ApiResponse::success(
        state.reporter.supported_networks().await,
    )))
}

/// Balances of one address across every registered network
pub async fn get_balances(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ApiResult<Json<ApiResponse<AggregateResult>>> {
    enforce_operation_limit(&state, BALANCE_OPERATION, connect_info)?;
    state.validator.validate(&address)?;

    info!("Balance check requested for {} on all networks", address);
    let result = state.aggregator.fetch_all(&address).await;

    Ok(Json(ApiResponse::success(result)))
}

/// Balance of one address on one network, in the aggregate shape
pub async fn get_network_balance(
    State(state): State<Arc<AppState>>,
    Path((address, network)): Path<(String, String)>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ApiResult<Json<ApiResponse<AggregateResult>>> {
    enforce_operation_limit(&state, BALANCE_OPERATION, connect_info)?;

    info!("Balance check requested for {} on {}", address, network);
    let balance = state.fetcher.fetch(&address, &network).await?;

    Ok(Json(ApiResponse::success(AggregateResult::single(
        &address, balance,
    ))))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} not found", uri))
}

/// Per-client, per-operation limit with the configured ceiling and window
fn enforce_operation_limit(
    state: &AppState,
    operation: &str,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> ApiResult<()> {
    let caller = caller_id(connect_info.map(|info| info.0));

    if state.rate_limiter.is_rate_limited(&caller, operation) {
        return Err(ApiError::rate_limited(
            "You are being rate limited. Please wait before trying again.",
            state.rate_limiter.reset_time(&caller, operation),
        ));
    }

    Ok(())
}
