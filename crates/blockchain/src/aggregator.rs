use futures::stream::{self, StreamExt};
use shared::{AggregateResult, BalanceResult, NetworkError, Result};
use std::sync::Arc;
use tracing::info;

use crate::fetcher::BalanceFetcher;

/// How an aggregation visits the registered networks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanOut {
    /// One network at a time, in registry order
    Sequential,
    /// Up to `max_in_flight` networks at once; results still come back in
    /// registry order
    Concurrent { max_in_flight: usize },
}

impl FanOut {
    /// `1` (or `0`) selects the sequential fan-out
    pub fn from_concurrency(concurrency: usize) -> Self {
        if concurrency <= 1 {
            FanOut::Sequential
        } else {
            FanOut::Concurrent {
                max_in_flight: concurrency,
            }
        }
    }
}

impl Default for FanOut {
    fn default() -> Self {
        FanOut::Sequential
    }
}

/// Queries one address across every registered network.
///
/// Per-network failures become entries in `AggregateResult::errors`; the
/// aggregation itself never fails.
pub struct BalanceAggregator {
    fetcher: Arc<BalanceFetcher>,
    fan_out: FanOut,
}

impl BalanceAggregator {
    pub fn new(fetcher: Arc<BalanceFetcher>) -> Self {
        Self::with_fan_out(fetcher, FanOut::Sequential)
    }

    pub fn with_fan_out(fetcher: Arc<BalanceFetcher>, fan_out: FanOut) -> Self {
        Self { fetcher, fan_out }
    }

    pub fn fan_out(&self) -> FanOut {
        self.fan_out
    }

    pub async fn fetch_all(&self, address: &str) -> AggregateResult {
        let network_ids: Vec<String> = self
            .fetcher
            .registry()
            .handles()
            .await
            .iter()
            .map(|h| h.id().to_string())
            .collect();

        let outcomes = match self.fan_out {
            FanOut::Sequential => self.fetch_sequential(address, network_ids).await,
            FanOut::Concurrent { max_in_flight } => {
                self.fetch_concurrent(address, network_ids, max_in_flight)
                    .await
            }
        };

        let mut result = AggregateResult::new(address);
        for (network, outcome) in outcomes {
            match outcome {
                Ok(balance) => result.balances.push(balance),
                Err(e) => result.errors.push(NetworkError {
                    network,
                    error: e.to_string(),
                }),
            }
        }

        info!(
            "Aggregated balances for {}: {} succeeded, {} failed",
            address,
            result.balances.len(),
            result.errors.len()
        );

        result
    }

    async fn fetch_sequential(
        &self,
        address: &str,
        network_ids: Vec<String>,
    ) -> Vec<(String, Result<BalanceResult>)> {
        let mut outcomes = Vec::with_capacity(network_ids.len());
        for network in network_ids {
            let outcome = self.fetcher.fetch(address, &network).await;
            outcomes.push((network, outcome));
        }
        outcomes
    }

    async fn fetch_concurrent(
        &self,
        address: &str,
        network_ids: Vec<String>,
        max_in_flight: usize,
    ) -> Vec<(String, Result<BalanceResult>)> {
        let fetcher = &self.fetcher;

        // `buffered` yields in input order regardless of completion order
        stream::iter(network_ids)
            .map(|network| async move {
                let outcome = fetcher.fetch(address, &network).await;
                (network, outcome)
            })
            .buffered(max_in_flight.max(1))
            .collect::<Vec<_>>()
            .await
    }
}
