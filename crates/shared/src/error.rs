use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Network {0} not supported or not configured")]
    UnsupportedNetwork(String),

    #[error("Invalid address format")]
    InvalidAddress(String),

    #[error("EVM RPC error: {0}")]
    EvmRpc(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
