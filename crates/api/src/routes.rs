use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers, rate_limit::rate_limit_middleware, AppState};

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Service info
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::status))

        // Networks & balances
        .route("/api/networks", get(handlers::list_networks))
        .route("/api/balances/:address", get(handlers::get_balances))
        .route(
            "/api/balances/:address/:network",
            get(handlers::get_network_balance),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
