use std::env;

use anyhow::Context;

use crate::models::{NetworkConfig, TokenInfo};

#[derive(Debug, Clone)]
pub struct Config {
    pub networks: Vec<NetworkConfig>,
    pub rpc: RpcConfig,
    pub aggregation: AggregationConfig,
    pub rate_limit: RateLimitConfig,
    pub health: HealthConfig,
    pub server: ServerConfig,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Per-request timeout for upstream JSON-RPC calls
    pub timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// 1 keeps the sequential fan-out; larger values bound concurrent fetches
    pub concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub command_max_requests: u32,
    pub command_window_ms: u64,
    pub cleanup_interval_secs: u64,
    pub http_max_requests: u32,
    pub http_window_ms: u64,
}

#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Catalogue entry before environment values are resolved
struct CatalogueEntry {
    id: &'static str,
    name: &'static str,
    symbol: &'static str,
    explorer_url: &'static str,
    rpc_url_var: &'static str,
    api_key_var: &'static str,
    tokens: &'static [(&'static str, &'static str, &'static str)],
}

const NETWORK_CATALOGUE: &[CatalogueEntry] = &[
    CatalogueEntry {
        id: "ethereum",
        name: "Ethereum",
        symbol: "ETH",
        explorer_url: "https://etherscan.io",
        rpc_url_var: "ETHEREUM_RPC_URL",
        api_key_var: "ETHERSCAN_API_KEY",
        tokens: &[
            ("USDT", "Tether USD", "0xdAC17F958D2ee523a2206206994597C13D831ec7"),
            ("USDC", "USD Coin", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"),
            ("DAI", "Dai Stablecoin", "0x6B175474E89094C44Da98b954EedeAC495271d0F"),
            ("WETH", "Wrapped Ether", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        ],
    },
    CatalogueEntry {
        id: "polygon",
        name: "Polygon",
        symbol: "MATIC",
        explorer_url: "https://polygonscan.com",
        rpc_url_var: "POLYGON_RPC_URL",
        api_key_var: "POLYGONSCAN_API_KEY",
        tokens: &[
            ("USDT", "Tether USD", "0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
            ("USDC", "USD Coin", "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"),
            ("DAI", "Dai Stablecoin", "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"),
            ("WMATIC", "Wrapped MATIC", "0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
        ],
    },
    CatalogueEntry {
        id: "bsc",
        name: "Binance Smart Chain",
        symbol: "BNB",
        explorer_url: "https://bscscan.com",
        rpc_url_var: "BSC_RPC_URL",
        api_key_var: "BSCSCAN_API_KEY",
        tokens: &[
            ("USDT", "Tether USD", "0x55d398326f99059fF775485246999027B3197955"),
            ("USDC", "USD Coin", "0x8AC76a51cc950d9822D68b83fE1Ad97B32Cd580d"),
            ("BUSD", "Binance USD", "0xe9e7CEA3DedcA5984780Bafc599bD69ADd087D56"),
            ("WBNB", "Wrapped BNB", "0xbb4CdB9CBd36B01bD1cBaEF60aF814a3f6F8E2A9"),
        ],
    },
    CatalogueEntry {
        id: "arbitrum",
        name: "Arbitrum",
        symbol: "ETH",
        explorer_url: "https://arbiscan.io",
        rpc_url_var: "ARBITRUM_RPC_URL",
        api_key_var: "ARBITRUMSCAN_API_KEY",
        tokens: &[],
    },
];

/// Native currency precision shared by every catalogued network
const NATIVE_DECIMALS: u8 = 18;

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::from_filename("config.env").ok();
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let value_or = |key: &str, default: &str| value(key).unwrap_or_else(|| default.to_string());

        let config = Config {
            networks: networks_from_lookup(&value),
            rpc: RpcConfig {
                timeout_ms: value_or("RPC_TIMEOUT_MS", "10000")
                    .parse()
                    .context("RPC_TIMEOUT_MS must be an integer")?,
            },
            aggregation: AggregationConfig {
                concurrency: value_or("AGGREGATION_CONCURRENCY", "1")
                    .parse()
                    .context("AGGREGATION_CONCURRENCY must be an integer")?,
            },
            rate_limit: RateLimitConfig {
                command_max_requests: value_or("COMMAND_RATE_LIMIT_MAX_REQUESTS", "5")
                    .parse()
                    .context("COMMAND_RATE_LIMIT_MAX_REQUESTS must be an integer")?,
                command_window_ms: value_or("COMMAND_RATE_LIMIT_WINDOW_MS", "60000")
                    .parse()
                    .context("COMMAND_RATE_LIMIT_WINDOW_MS must be an integer")?,
                cleanup_interval_secs: value_or("RATE_LIMIT_CLEANUP_INTERVAL_SECS", "300")
                    .parse()
                    .context("RATE_LIMIT_CLEANUP_INTERVAL_SECS must be an integer")?,
                http_max_requests: value_or("RATE_LIMIT_MAX_REQUESTS", "100")
                    .parse()
                    .context("RATE_LIMIT_MAX_REQUESTS must be an integer")?,
                http_window_ms: value_or("RATE_LIMIT_WINDOW_MS", "900000")
                    .parse()
                    .context("RATE_LIMIT_WINDOW_MS must be an integer")?,
            },
            health: HealthConfig {
                check_interval_secs: value_or("HEALTH_CHECK_INTERVAL_SECS", "600")
                    .parse()
                    .context("HEALTH_CHECK_INTERVAL_SECS must be an integer")?,
            },
            server: ServerConfig {
                host: value_or("HOST", "0.0.0.0"),
                port: value_or("PORT", "3000")
                    .parse()
                    .context("PORT must be a valid port number")?,
            },
            environment: value("NODE_ENV")
                .or_else(|| value("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.rate_limit.cleanup_interval_secs == 0 {
            anyhow::bail!("RATE_LIMIT_CLEANUP_INTERVAL_SECS must be greater than zero");
        }
        if self.health.check_interval_secs == 0 {
            anyhow::bail!("HEALTH_CHECK_INTERVAL_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn configured_networks(&self) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.iter().filter(|n| n.is_configured())
    }
}

fn networks_from_lookup<F>(value: &F) -> Vec<NetworkConfig>
where
    F: Fn(&str) -> Option<String>,
{
    NETWORK_CATALOGUE
        .iter()
        .map(|entry| NetworkConfig {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            symbol: entry.symbol.to_string(),
            decimals: NATIVE_DECIMALS,
            rpc_url: value(entry.rpc_url_var),
            explorer_url: entry.explorer_url.to_string(),
            api_key: value(entry.api_key_var),
            tokens: entry
                .tokens
                .iter()
                .map(|(symbol, name, address)| TokenInfo::new(symbol, name, address))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.networks.len(), 4);
        assert_eq!(config.configured_networks().count(), 0);
        assert_eq!(config.rpc.timeout_ms, 10_000);
        assert_eq!(config.aggregation.concurrency, 1);
        assert_eq!(config.rate_limit.command_max_requests, 5);
        assert_eq!(config.rate_limit.command_window_ms, 60_000);
        assert_eq!(config.rate_limit.cleanup_interval_secs, 300);
        assert_eq!(config.rate_limit.http_max_requests, 100);
        assert_eq!(config.rate_limit.http_window_ms, 900_000);
        assert_eq!(config.health.check_interval_secs, 600);
        assert_eq!(config.server.port, 3000);
        assert!(!config.is_production());
    }

    #[test]
    fn test_network_order_and_metadata() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        let ids: Vec<&str> = config.networks.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["ethereum", "polygon", "bsc", "arbitrum"]);

        let bsc = &config.networks[2];
        assert_eq!(bsc.name, "Binance Smart Chain");
        assert_eq!(bsc.symbol, "BNB");
        assert_eq!(bsc.decimals, 18);
        assert_eq!(bsc.tokens.len(), 4);
        assert!(config.networks[3].tokens.is_empty());
    }

    #[test]
    fn test_rpc_urls_and_api_keys_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("ETHEREUM_RPC_URL", "https://eth.example"),
            ("ETHERSCAN_API_KEY", "secret"),
            ("POLYGON_RPC_URL", "   "),
        ]))
        .unwrap();

        let configured: Vec<&str> = config.configured_networks().map(|n| n.id.as_str()).collect();
        assert_eq!(configured, vec!["ethereum"]);
        assert!(config.networks[0].has_api_key());
        assert!(!config.networks[1].is_configured());
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let result = Config::from_lookup(lookup(&[("PORT", "not-a-port")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_production_flag() {
        let config = Config::from_lookup(lookup(&[("NODE_ENV", "production")])).unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_app_env_fallback() {
        let config = Config::from_lookup(lookup(&[("APP_ENV", "production")])).unwrap();
        assert!(config.is_production());

        let config = Config::from_lookup(lookup(&[
            ("NODE_ENV", "staging"),
            ("APP_ENV", "production"),
        ]))
        .unwrap();
        assert_eq!(config.environment, "staging");
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        assert!(Config::from_lookup(lookup(&[("HEALTH_CHECK_INTERVAL_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RATE_LIMIT_CLEANUP_INTERVAL_SECS", "0")])).is_err());
    }
}
