pub mod address;
pub mod aggregator;
pub mod client;
pub mod evm_client;
pub mod fetcher;
pub mod network_status;
pub mod registry;
pub mod units;

pub use address::{is_evm_address, AddressValidator, EvmAddressValidator};
pub use aggregator::{BalanceAggregator, FanOut};
pub use client::{ChainClient, ClientConnector, ContractCall};
pub use evm_client::{EvmClient, HttpConnector};
pub use fetcher::{BalanceFetcher, OmitReason, TokenLookup, MAX_TOKEN_CANDIDATES};
pub use network_status::NetworkStatusReporter;
pub use registry::{ProviderHandle, ProviderRegistry};
pub use units::{format_units, parse_hex_u128};
