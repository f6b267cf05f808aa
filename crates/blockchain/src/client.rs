use async_trait::async_trait;
use shared::{NetworkConfig, Result};
use std::sync::Arc;

use crate::units::parse_hex_u128;

/// `balanceOf(address)`
pub const BALANCE_OF_SELECTOR: &str = "70a08231";
/// `decimals()`
pub const DECIMALS_SELECTOR: &str = "313ce567";

/// Read-only ERC-20 calls issued during token enrichment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    BalanceOf(String),
    Decimals,
}

impl ContractCall {
    pub fn method(&self) -> &'static str {
        match self {
            ContractCall::BalanceOf(_) => "balanceOf",
            ContractCall::Decimals => "decimals",
        }
    }

    /// ABI-encoded calldata: selector followed by 32-byte arguments
    pub fn encode(&self) -> String {
        match self {
            ContractCall::BalanceOf(owner) => {
                let owner = owner.trim_start_matches("0x").to_lowercase();
                format!("0x{}{:0>64}", BALANCE_OF_SELECTOR, owner)
            }
            ContractCall::Decimals => format!("0x{}", DECIMALS_SELECTOR),
        }
    }
}

/// Connection to one chain's RPC endpoint
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current chain height; used as the connectivity check
    async fn get_block_number(&self) -> Result<u64>;

    /// Native balance in the smallest unit
    async fn get_balance(&self, address: &str) -> Result<u128>;

    /// Execute a read-only contract call and return the raw hex result
    async fn call(&self, contract: &str, call: ContractCall) -> Result<String>;

    async fn erc20_balance_of(&self, contract: &str, owner: &str) -> Result<u128> {
        let raw = self
            .call(contract, ContractCall::BalanceOf(owner.to_string()))
            .await?;
        parse_hex_u128(&raw)
    }

    async fn erc20_decimals(&self, contract: &str) -> Result<u8> {
        let raw = self.call(contract, ContractCall::Decimals).await?;
        let decimals = parse_hex_u128(&raw)?;
        u8::try_from(decimals).map_err(|_| {
            shared::Error::EvmRpc(format!(
                "decimals() returned out-of-range value {} for {}",
                decimals, contract
            ))
        })
    }
}

/// Opens a client for a configured network during registry initialization
pub trait ClientConnector: Send + Sync {
    fn connect(&self, config: &NetworkConfig) -> Result<Arc<dyn ChainClient>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_balance_of() {
        let call =
            ContractCall::BalanceOf("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6".to_string());
        let encoded = call.encode();

        assert!(encoded.starts_with("0x70a08231"));
        // selector (8) + one 32-byte word (64) + prefix (2)
        assert_eq!(encoded.len(), 2 + 8 + 64);
        assert!(encoded.ends_with("742d35cc6634c0532925a3b8d4c9db96c4b4d8b6"));
        assert!(encoded[10..34].chars().all(|c| c == '0'));
    }

    #[test]
    fn test_encode_decimals() {
        assert_eq!(ContractCall::Decimals.encode(), "0x313ce567");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(ContractCall::BalanceOf(String::new()).method(), "balanceOf");
        assert_eq!(ContractCall::Decimals.method(), "decimals");
    }
}
