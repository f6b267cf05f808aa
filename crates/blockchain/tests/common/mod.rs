#![allow(dead_code)]

use async_trait::async_trait;
use blockchain::{ChainClient, ClientConnector, ContractCall};
use shared::{Error, NetworkConfig, Result, TokenInfo};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ADDRESS: &str = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6";
pub const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

/// In-memory chain client with scripted answers
pub struct MockChainClient {
    name: String,
    block_number: Result<u64>,
    balance: Result<u128>,
    token_balances: HashMap<String, Result<u128>>,
    token_decimals: HashMap<String, Result<u8>>,
    delay: Duration,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockChainClient {
    pub fn new(name: &str, balance: u128) -> Self {
        Self {
            name: name.to_string(),
            block_number: Ok(19_000_000),
            balance: Ok(balance),
            token_balances: HashMap::new(),
            token_decimals: HashMap::new(),
            delay: Duration::ZERO,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_balance(mut self, message: &str) -> Self {
        self.balance = Err(Error::EvmRpc(message.to_string()));
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.block_number = Err(Error::EvmRpc("connection refused".to_string()));
        self
    }

    pub fn with_token(mut self, contract: &str, balance: u128, decimals: u8) -> Self {
        let key = contract.to_lowercase();
        self.token_balances.insert(key.clone(), Ok(balance));
        self.token_decimals.insert(key, Ok(decimals));
        self
    }

    pub fn with_failing_token(mut self, contract: &str) -> Self {
        let key = contract.to_lowercase();
        self.token_balances
            .insert(key.clone(), Err(Error::EvmRpc("execution reverted".to_string())));
        self.token_decimals.insert(key, Ok(18));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Share a call log across clients to observe ordering
    pub fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.log = log;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.log.lock().unwrap().push(event);
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_block_number(&self) -> Result<u64> {
        self.block_number.clone()
    }

    async fn get_balance(&self, address: &str) -> Result<u128> {
        self.record(format!("{}:start:{}", self.name, address));
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.record(format!("{}:end", self.name));
        self.balance.clone()
    }

    async fn call(&self, contract: &str, call: ContractCall) -> Result<String> {
        let key = contract.to_lowercase();
        self.record(format!("{}:{}:{}", self.name, call.method(), key));

        match call {
            ContractCall::BalanceOf(_) => match self.token_balances.get(&key) {
                Some(Ok(balance)) => Ok(format!("0x{:064x}", balance)),
                Some(Err(e)) => Err(e.clone()),
                None => Ok("0x".to_string()),
            },
            ContractCall::Decimals => match self.token_decimals.get(&key) {
                Some(Ok(decimals)) => Ok(format!("0x{:064x}", decimals)),
                Some(Err(e)) => Err(e.clone()),
                None => Ok("0x".to_string()),
            },
        }
    }
}

/// Hands out pre-built clients by network id
#[derive(Default)]
pub struct MockConnector {
    clients: HashMap<String, Arc<MockChainClient>>,
}

impl MockConnector {
    pub fn with_client(mut self, network_id: &str, client: MockChainClient) -> Self {
        self.clients.insert(network_id.to_string(), Arc::new(client));
        self
    }
}

impl ClientConnector for MockConnector {
    fn connect(&self, config: &NetworkConfig) -> Result<Arc<dyn ChainClient>> {
        match self.clients.get(&config.id) {
            Some(client) => Ok(client.clone() as Arc<dyn ChainClient>),
            None => Err(Error::EvmRpc(format!("cannot reach {}", config.id))),
        }
    }
}

pub fn network(id: &str, name: &str, symbol: &str) -> NetworkConfig {
    NetworkConfig {
        id: id.to_string(),
        name: name.to_string(),
        symbol: symbol.to_string(),
        decimals: 18,
        rpc_url: Some(format!("https://{}.rpc.example", id)),
        explorer_url: format!("https://{}.explorer.example", id),
        api_key: None,
        tokens: Vec::new(),
    }
}

pub fn ethereum() -> NetworkConfig {
    let mut config = network("ethereum", "Ethereum", "ETH");
    config.explorer_url = "https://etherscan.io".to_string();
    config
}

pub fn token(index: usize) -> TokenInfo {
    TokenInfo::new(
        &format!("TK{}", index),
        &format!("Token {}", index),
        &format!("0x{:040x}", index + 1),
    )
}
