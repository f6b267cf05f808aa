use anyhow::Result;
use api::{logging, routes::create_router, AppState, RateLimitConfig};
use blockchain::{FanOut, HttpConnector, ProviderRegistry};
use shared::config::Config;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    logging::init_for_environment(&config.environment);
    tracing::info!("Starting Web3 Balance Bot API ({})", config.environment);

    // Connect every configured network
    let registry = Arc::new(ProviderRegistry::new(config.networks.clone()));
    let connector = HttpConnector::new(Duration::from_millis(config.rpc.timeout_ms));
    let connected = registry.initialize(&connector).await;
    if connected == 0 {
        tracing::warn!("No Web3 providers connected; balance lookups will fail");
    }

    let fan_out = FanOut::from_concurrency(config.aggregation.concurrency);
    tracing::info!("Aggregation fan-out: {:?}", fan_out);

    let app_state = Arc::new(AppState::new(
        registry,
        fan_out,
        RateLimitConfig::from(&config.rate_limit),
        config.environment.clone(),
    ));

    // Background tasks
    let cleanup_interval = app_state.rate_limiter.config().cleanup_interval;
    let cleanup_task = app_state
        .rate_limiter
        .clone()
        .spawn_cleanup(cleanup_interval);
    let health_task = app_state
        .health
        .clone()
        .start(Duration::from_secs(config.health.check_interval_secs));

    let app = create_router(app_state.clone());

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("API server listening on {}", addr);
    tracing::info!("Health check available at http://{}/health", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    cleanup_task.abort();
    health_task.abort();
    app_state.registry.shutdown().await;

    tracing::info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, shutting down gracefully");
}
