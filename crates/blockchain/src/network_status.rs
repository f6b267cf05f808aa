use shared::{NetworkStatus, SupportedNetwork};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::registry::ProviderRegistry;

/// Read-only connectivity view over the provider registry
#[derive(Clone)]
pub struct NetworkStatusReporter {
    registry: Arc<ProviderRegistry>,
}

impl NetworkStatusReporter {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub async fn snapshot(&self) -> BTreeMap<String, NetworkStatus> {
        self.registry.status_snapshot().await
    }

    pub async fn supported_networks(&self) -> Vec<SupportedNetwork> {
        self.registry.list_supported().await
    }

    pub async fn connected_count(&self) -> usize {
        self.snapshot()
            .await
            .values()
            .filter(|status| status.connected)
            .count()
    }
}
