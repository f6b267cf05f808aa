use shared::{NetworkConfig, NetworkStatus, Result, SupportedNetwork};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::client::{ChainClient, ClientConnector};

/// A configured network paired with its live client
pub struct ProviderHandle {
    config: NetworkConfig,
    client: Arc<dyn ChainClient>,
}

impl ProviderHandle {
    pub fn new(config: NetworkConfig, client: Arc<dyn ChainClient>) -> Self {
        Self { config, client }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("id", &self.config.id)
            .field("name", &self.config.name)
            .finish()
    }
}

/// Registry of reachable networks.
///
/// Holds the full static network set plus a handle for every network whose
/// RPC endpoint answered the connectivity check. A network id has a handle if and
/// only if it is considered configured. Handles keep insertion order, which
/// is the order aggregation visits them in.
pub struct ProviderRegistry {
    networks: Vec<NetworkConfig>,
    handles: RwLock<Vec<Arc<ProviderHandle>>>,
}

impl ProviderRegistry {
    pub fn new(networks: Vec<NetworkConfig>) -> Self {
        Self {
            networks,
            handles: RwLock::new(Vec::new()),
        }
    }

    /// Static network set, registered or not
    pub fn networks(&self) -> &[NetworkConfig] {
        &self.networks
    }

    /// Check every configured network and register the ones that answer.
    ///
    /// Replaces any previously registered handles. One network failing its
    /// check never aborts the others. Returns the number registered.
    pub async fn initialize(&self, connector: &dyn ClientConnector) -> usize {
        info!("Initializing Web3 providers...");

        let mut connected = Vec::new();

        for config in &self.networks {
            if !config.is_configured() {
                warn!("No RPC URL provided for {} ({})", config.name, config.id);
                continue;
            }

            match Self::connect_one(config, connector).await {
                Ok((client, block_number)) => {
                    info!(
                        "Connected to {} ({}) - Block: {}",
                        config.name, config.id, block_number
                    );
                    connected.push(Arc::new(ProviderHandle::new(config.clone(), client)));
                }
                Err(e) => {
                    error!("Failed to connect to {} ({}): {}", config.name, config.id, e);
                }
            }
        }

        let count = connected.len();
        *self.handles.write().await = connected;

        info!("Initialized {} Web3 providers", count);
        count
    }

    async fn connect_one(
        config: &NetworkConfig,
        connector: &dyn ClientConnector,
    ) -> Result<(Arc<dyn ChainClient>, u64)> {
        let client = connector.connect(config)?;
        let block_number = client.get_block_number().await?;
        Ok((client, block_number))
    }

    /// Register a client directly, replacing any handle with the same id
    pub async fn register(&self, config: NetworkConfig, client: Arc<dyn ChainClient>) {
        let handle = Arc::new(ProviderHandle::new(config, client));
        let mut handles = self.handles.write().await;

        match handles.iter().position(|h| h.id() == handle.id()) {
            Some(index) => handles[index] = handle,
            None => handles.push(handle),
        }
    }

    pub async fn get(&self, network_id: &str) -> Option<Arc<ProviderHandle>> {
        self.handles
            .read()
            .await
            .iter()
            .find(|h| h.id() == network_id)
            .cloned()
    }

    /// Registered handles in insertion order
    pub async fn handles(&self) -> Vec<Arc<ProviderHandle>> {
        self.handles.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.handles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.handles.read().await.is_empty()
    }

    /// Every statically known network with whether it is currently registered
    pub async fn list_supported(&self) -> Vec<SupportedNetwork> {
        let handles = self.handles.read().await;

        self.networks
            .iter()
            .map(|network| SupportedNetwork {
                id: network.id.clone(),
                name: network.name.clone(),
                symbol: network.symbol.clone(),
                configured: handles.iter().any(|h| h.id() == network.id),
            })
            .collect()
    }

    /// Connectivity as of the last connectivity check. Nothing is re-checked here.
    pub async fn status_snapshot(&self) -> BTreeMap<String, NetworkStatus> {
        self.handles
            .read()
            .await
            .iter()
            .map(|handle| {
                let config = handle.config();
                let status = NetworkStatus {
                    name: config.name.clone(),
                    connected: true,
                    rpc_url: if config.is_configured() {
                        "Configured".to_string()
                    } else {
                        "Not configured".to_string()
                    },
                };
                (config.id.clone(), status)
            })
            .collect()
    }

    /// Drop every handle; the registry reports nothing as configured afterwards
    pub async fn shutdown(&self) {
        let mut handles = self.handles.write().await;
        let count = handles.len();
        handles.clear();
        info!("Released {} Web3 providers", count);
    }
}
