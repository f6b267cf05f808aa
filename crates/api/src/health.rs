use blockchain::NetworkStatusReporter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

/// Point-in-time health view
#[derive(Debug, Clone, Serialize)]
pub struct HealthSnapshot {
    /// Network id -> connected as of `last_check`
    pub networks: BTreeMap<String, bool>,
    pub last_check: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// Background service that periodically records per-network connectivity
pub struct HealthCheckService {
    reporter: NetworkStatusReporter,
    started_at: Instant,
    snapshot: RwLock<HealthSnapshot>,
}

impl HealthCheckService {
    pub fn new(reporter: NetworkStatusReporter) -> Self {
        Self {
            reporter,
            started_at: Instant::now(),
            snapshot: RwLock::new(HealthSnapshot {
                networks: BTreeMap::new(),
                last_check: Utc::now(),
                uptime_secs: 0,
            }),
        }
    }

    /// Start the periodic connectivity check.
    ///
    /// The first check runs immediately; later ones every `check_interval`.
    pub fn start(self: Arc<Self>, check_interval: Duration) -> tokio::task::JoinHandle<()> {
        info!(
            "Starting health check service with check interval: {:?}",
            check_interval
        );

        tokio::spawn(async move {
            let mut ticker = interval(check_interval);

            loop {
                ticker.tick().await;
                self.check_network_connectivity().await;
            }
        })
    }

    /// Refresh the connectivity map from the status reporter
    pub async fn check_network_connectivity(&self) {
        let statuses = self.reporter.snapshot().await;

        let mut networks = BTreeMap::new();
        for (network, status) in statuses {
            if !status.connected {
                warn!("Network connectivity issue: {} is disconnected", network);
            }
            networks.insert(network, status.connected);
        }

        let mut snapshot = self.snapshot.write().await;
        snapshot.networks = networks;
        snapshot.last_check = Utc::now();
        snapshot.uptime_secs = self.uptime_secs();

        debug!("Network connectivity check completed");
    }

    pub async fn health_status(&self) -> HealthSnapshot {
        let mut snapshot = self.snapshot.read().await.clone();
        snapshot.uptime_secs = self.uptime_secs();
        snapshot
    }

    /// Healthy when at least one network was connected at the last check
    pub async fn is_healthy(&self) -> bool {
        self.snapshot
            .read()
            .await
            .networks
            .values()
            .any(|connected| *connected)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blockchain::{ChainClient, ContractCall, ProviderRegistry};
    use shared::{NetworkConfig, Result};

    struct StaticClient;

    #[async_trait]
    impl ChainClient for StaticClient {
        async fn get_block_number(&self) -> Result<u64> {
            Ok(1)
        }

        async fn get_balance(&self, _address: &str) -> Result<u128> {
            Ok(0)
        }

        async fn call(&self, _contract: &str, _call: ContractCall) -> Result<String> {
            Ok("0x".to_string())
        }
    }

    fn network(id: &str) -> NetworkConfig {
        NetworkConfig {
            id: id.to_string(),
            name: id.to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
            rpc_url: Some("http://localhost:8545".to_string()),
            explorer_url: "https://etherscan.io".to_string(),
            api_key: None,
            tokens: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_unhealthy_before_first_check() {
        let registry = Arc::new(ProviderRegistry::new(vec![network("ethereum")]));
        registry
            .register(network("ethereum"), Arc::new(StaticClient))
            .await;
        let service = HealthCheckService::new(NetworkStatusReporter::new(registry));

        assert!(!service.is_healthy().await);
        assert!(service.health_status().await.networks.is_empty());
    }

    #[tokio::test]
    async fn test_healthy_with_one_connected_network() {
        let registry = Arc::new(ProviderRegistry::new(vec![
            network("ethereum"),
            network("polygon"),
        ]));
        registry
            .register(network("polygon"), Arc::new(StaticClient))
            .await;
        let service = HealthCheckService::new(NetworkStatusReporter::new(registry));

        service.check_network_connectivity().await;

        let status = service.health_status().await;
        assert_eq!(status.networks.len(), 1);
        assert_eq!(status.networks.get("polygon"), Some(&true));
        assert!(service.is_healthy().await);
    }

    #[tokio::test]
    async fn test_unhealthy_after_shutdown() {
        let registry = Arc::new(ProviderRegistry::new(vec![network("ethereum")]));
        registry
            .register(network("ethereum"), Arc::new(StaticClient))
            .await;
        let service = HealthCheckService::new(NetworkStatusReporter::new(registry.clone()));

        service.check_network_connectivity().await;
        assert!(service.is_healthy().await);

        registry.shutdown().await;
        service.check_network_connectivity().await;
        assert!(!service.is_healthy().await);
    }

    #[tokio::test]
    async fn test_start_runs_first_check_immediately() {
        let registry = Arc::new(ProviderRegistry::new(vec![network("ethereum")]));
        registry
            .register(network("ethereum"), Arc::new(StaticClient))
            .await;
        let service = Arc::new(HealthCheckService::new(NetworkStatusReporter::new(registry)));

        let handle = service.clone().start(Duration::from_secs(3600));
        for _ in 0..50 {
            if service.is_healthy().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert!(service.is_healthy().await);
    }
}
