use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Network models

/// Entry of a network's static token allow-list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub contract_address: String,
}

impl TokenInfo {
    pub fn new(symbol: &str, name: &str, contract_address: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            contract_address: contract_address.to_string(),
        }
    }
}

/// Static description of one supported chain. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// `None` means the network is unconfigured
    pub rpc_url: Option<String>,
    /// Explorer base URL, e.g. `https://etherscan.io`
    pub explorer_url: String,
    /// Explorer API key; token enrichment only runs when present
    pub api_key: Option<String>,
    pub tokens: Vec<TokenInfo>,
}

impl NetworkConfig {
    pub fn is_configured(&self) -> bool {
        self.rpc_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Explorer page for an address on this network
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url.trim_end_matches('/'), address)
    }
}

// Balance models

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub symbol: String,
    pub name: String,
    pub contract_address: String,
    /// Decimal-adjusted balance
    pub balance: String,
    pub decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResult {
    pub network: String,
    pub symbol: String,
    pub address: String,
    /// Native balance in human units
    pub balance: String,
    /// Native balance in the smallest unit
    pub balance_raw: String,
    pub token_balances: Vec<TokenBalance>,
    pub explorer_url: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkError {
    pub network: String,
    pub error: String,
}

/// Outcome of querying one address across every registered network.
///
/// `balances.len() + errors.len()` equals the number of networks that were
/// registered when the fetch started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub address: String,
    pub balances: Vec<BalanceResult>,
    pub errors: Vec<NetworkError>,
    pub timestamp: DateTime<Utc>,
}

impl AggregateResult {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            balances: Vec::new(),
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Wrap a single-network result in the aggregate shape
    pub fn single(address: &str, balance: BalanceResult) -> Self {
        Self {
            address: address.to_string(),
            balances: vec![balance],
            errors: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn network_count(&self) -> usize {
        self.balances.len() + self.errors.len()
    }
}

// Status models

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedNetwork {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub configured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub name: String,
    pub connected: bool,
    /// "Configured" or "Not configured"
    pub rpc_url: String,
}
