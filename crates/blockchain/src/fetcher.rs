use chrono::Utc;
use shared::{BalanceResult, Error, Result, TokenBalance, TokenInfo};
use std::sync::Arc;
use tracing::{debug, error};

use crate::address::{AddressValidator, EvmAddressValidator};
use crate::registry::{ProviderHandle, ProviderRegistry};
use crate::units::format_units;

/// Upper bound on allow-list entries queried per fetch
pub const MAX_TOKEN_CANDIDATES: usize = 10;

/// Why a candidate token was left out of a balance result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OmitReason {
    ZeroBalance,
    CallFailed(String),
}

/// Outcome of looking up one token. Enrichment never raises.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    Found(TokenBalance),
    Omitted(OmitReason),
}

/// Fetches the native balance (and best-effort token balances) of one
/// address on one registered network
pub struct BalanceFetcher {
    registry: Arc<ProviderRegistry>,
    validator: Arc<dyn AddressValidator>,
}

impl BalanceFetcher {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self::with_validator(registry, Arc::new(EvmAddressValidator))
    }

    pub fn with_validator(
        registry: Arc<ProviderRegistry>,
        validator: Arc<dyn AddressValidator>,
    ) -> Self {
        Self { registry, validator }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Fetch the balance of `address` on `network_id`.
    ///
    /// Fails with `UnsupportedNetwork` when the network is not registered,
    /// `InvalidAddress` when the address is malformed, and propagates client
    /// errors unchanged. Nothing is retried here.
    pub async fn fetch(&self, address: &str, network_id: &str) -> Result<BalanceResult> {
        match self.try_fetch(address, network_id).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!(
                    network = network_id,
                    address = address,
                    "Error getting balance for {} on {}: {}",
                    address,
                    network_id,
                    e
                );
                Err(e)
            }
        }
    }

    async fn try_fetch(&self, address: &str, network_id: &str) -> Result<BalanceResult> {
        let handle = self
            .registry
            .get(network_id)
            .await
            .ok_or_else(|| Error::UnsupportedNetwork(network_id.to_string()))?;

        self.validator.validate(address)?;

        let config = handle.config();
        let raw = handle.client().get_balance(address).await?;

        let token_balances = if config.has_api_key() {
            self.token_balances(&handle, address).await
        } else {
            Vec::new()
        };

        Ok(BalanceResult {
            network: config.name.clone(),
            symbol: config.symbol.clone(),
            address: address.to_string(),
            balance: format_units(raw, config.decimals),
            balance_raw: raw.to_string(),
            token_balances,
            explorer_url: config.address_url(address),
            timestamp: Utc::now(),
        })
    }

    /// Best-effort ERC-20 balances over the first `MAX_TOKEN_CANDIDATES`
    /// allow-list entries. Zero balances and failed calls are dropped.
    async fn token_balances(&self, handle: &ProviderHandle, address: &str) -> Vec<TokenBalance> {
        let mut balances = Vec::new();

        for token in handle.config().tokens.iter().take(MAX_TOKEN_CANDIDATES) {
            match Self::lookup_token(handle, token, address).await {
                TokenLookup::Found(balance) => balances.push(balance),
                TokenLookup::Omitted(reason) => {
                    debug!(
                        "Skipping {} on {} for {}: {:?}",
                        token.symbol,
                        handle.id(),
                        address,
                        reason
                    );
                }
            }
        }

        balances
    }

    pub async fn lookup_token(
        handle: &ProviderHandle,
        token: &TokenInfo,
        address: &str,
    ) -> TokenLookup {
        let client = handle.client();

        let raw = match client.erc20_balance_of(&token.contract_address, address).await {
            Ok(raw) => raw,
            Err(e) => return TokenLookup::Omitted(OmitReason::CallFailed(e.to_string())),
        };

        let decimals = match client.erc20_decimals(&token.contract_address).await {
            Ok(decimals) => decimals,
            Err(e) => return TokenLookup::Omitted(OmitReason::CallFailed(e.to_string())),
        };

        if raw == 0 {
            return TokenLookup::Omitted(OmitReason::ZeroBalance);
        }

        TokenLookup::Found(TokenBalance {
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            contract_address: token.contract_address.clone(),
            balance: format_units(raw, decimals),
            decimals,
        })
    }
}
