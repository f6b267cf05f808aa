use async_trait::async_trait;
use shared::{Error, NetworkConfig, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::client::{ChainClient, ClientConnector, ContractCall};
use crate::units::parse_hex_u128;

/// JSON-RPC client for an EVM-compatible chain (Ethereum, Polygon, BSC, Arbitrum)
pub struct EvmClient {
    network: String,
    rpc_url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl EvmClient {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(network: &str, rpc_url: &str, timeout: Duration) -> Result<Self> {
        info!("Initializing {} client with RPC: {}", network, rpc_url);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::EvmRpc(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            network: network.to_string(),
            rpc_url: rpc_url.to_string(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Send one JSON-RPC request and return its `result` member
    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("{} -> {} (id {})", self.network, method, id);

        let request_body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::EvmRpc(format!("Failed to send {} request: {}", method, e)))?;

        if !response.status().is_success() {
            return Err(Error::EvmRpc(format!(
                "{} request failed with status: {}",
                method,
                response.status()
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::EvmRpc(format!("Failed to parse {} response: {}", method, e)))?;

        if let Some(error) = response_json.get("error") {
            let error_message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(Error::EvmRpc(format!("RPC error: {}", error_message)));
        }

        response_json
            .get("result")
            .cloned()
            .ok_or_else(|| Error::EvmRpc(format!("Missing result in {} response", method)))
    }

    async fn request_hex(&self, method: &str, params: serde_json::Value) -> Result<String> {
        let result = self.request(method, params).await?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::EvmRpc(format!("Non-string result in {} response", method)))
    }
}

#[async_trait]
impl ChainClient for EvmClient {
    async fn get_block_number(&self) -> Result<u64> {
        let raw = self.request_hex("eth_blockNumber", serde_json::json!([])).await?;
        let height = parse_hex_u128(&raw)?;
        u64::try_from(height)
            .map_err(|_| Error::EvmRpc(format!("Block number {} out of range", height)))
    }

    async fn get_balance(&self, address: &str) -> Result<u128> {
        let raw = self
            .request_hex("eth_getBalance", serde_json::json!([address, "latest"]))
            .await?;
        parse_hex_u128(&raw)
    }

    async fn call(&self, contract: &str, call: ContractCall) -> Result<String> {
        debug!("{}: eth_call {} on {}", self.network, call.method(), contract);
        self.request_hex(
            "eth_call",
            serde_json::json!([{ "to": contract, "data": call.encode() }, "latest"]),
        )
        .await
    }
}

/// Builds `EvmClient`s over HTTP JSON-RPC
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout: Duration,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ClientConnector for HttpConnector {
    fn connect(&self, config: &NetworkConfig) -> Result<Arc<dyn ChainClient>> {
        let rpc_url = config
            .rpc_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Configuration(format!("No RPC URL for {}", config.id)))?;

        let client = EvmClient::new(&config.name, rpc_url, self.timeout)?;
        Ok(Arc::new(client))
    }
}
