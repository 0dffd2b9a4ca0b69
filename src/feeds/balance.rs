// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet native balance feed.
//!
//! One poller runs per open wizard session, watching the session wallet on
//! the session's source network, and stops when the session closes.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Reading;
use crate::blockchain::{ChainClientError, EvmClient, NetworkConfig};

/// Default interval between balance refreshes.
pub const DEFAULT_BALANCE_INTERVAL: Duration = Duration::from_secs(30);

/// Source of a wallet's native balance in wei.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn native_balance(
        &self,
        network: &NetworkConfig,
        wallet: Address,
    ) -> Result<U256, ChainClientError>;
}

/// [`BalanceSource`] reading `eth_getBalance` from the network's RPC.
#[derive(Debug, Default)]
pub struct RpcBalanceSource;

#[async_trait]
impl BalanceSource for RpcBalanceSource {
    async fn native_balance(
        &self,
        network: &NetworkConfig,
        wallet: Address,
    ) -> Result<U256, ChainClientError> {
        EvmClient::new(*network)?.get_native_balance(wallet).await
    }
}

/// Background poller publishing one wallet's balance on one network.
pub struct BalancePoller {
    source: Arc<dyn BalanceSource>,
    network: NetworkConfig,
    wallet: Address,
    poll_interval: Duration,
    tx: watch::Sender<Reading<U256>>,
}

impl BalancePoller {
    /// Create a poller and the receiver its readings are published on.
    pub fn new(
        source: Arc<dyn BalanceSource>,
        network: NetworkConfig,
        wallet: Address,
        poll_interval: Duration,
    ) -> (Self, watch::Receiver<Reading<U256>>) {
        let (tx, rx) = watch::channel(Reading::Loading);
        (
            Self {
                source,
                network,
                wallet,
                poll_interval,
                tx,
            },
            rx,
        )
    }

    /// Run the poller loop until the cancellation token is triggered.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            network = %self.network.name,
            wallet = %self.wallet,
            interval_secs = self.poll_interval.as_secs(),
            "Balance poller starting"
        );

        loop {
            tokio::select! {
                _ = self.poll_step() => {},
                _ = shutdown.cancelled() => break,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => break,
            }
        }

        debug!(wallet = %self.wallet, "Balance poller shutting down");
    }

    async fn poll_step(&self) {
        let reading = match self.source.native_balance(&self.network, self.wallet).await {
            Ok(balance) => Reading::Ready(balance),
            Err(e) => {
                warn!(
                    network = %self.network.name,
                    wallet = %self.wallet,
                    error = %e,
                    "Balance poller: fetch failed"
                );
                Reading::Unavailable
            }
        };
        self.tx.send_replace(reading);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::SEPOLIA;
    use std::sync::Mutex;

    struct FixedBalance(Mutex<Result<U256, String>>);

    #[async_trait]
    impl BalanceSource for FixedBalance {
        async fn native_balance(
            &self,
            _network: &NetworkConfig,
            _wallet: Address,
        ) -> Result<U256, ChainClientError> {
            self.0
                .lock()
                .unwrap()
                .clone()
                .map_err(ChainClientError::RpcError)
        }
    }

    #[tokio::test]
    async fn publishes_balance_then_unavailable() {
        let source = Arc::new(FixedBalance(Mutex::new(Ok(U256::from(7u64)))));
        let (poller, rx) = BalancePoller::new(
            source.clone(),
            SEPOLIA,
            Address::ZERO,
            DEFAULT_BALANCE_INTERVAL,
        );
        assert!(rx.borrow().is_loading());

        poller.poll_step().await;
        assert_eq!(*rx.borrow(), Reading::Ready(U256::from(7u64)));

        *source.0.lock().unwrap() = Err("connection reset".into());
        poller.poll_step().await;
        assert_eq!(*rx.borrow(), Reading::Unavailable);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let source = Arc::new(FixedBalance(Mutex::new(Ok(U256::from(1u64)))));
        let (poller, mut rx) =
            BalancePoller::new(source, SEPOLIA, Address::ZERO, DEFAULT_BALANCE_INTERVAL);
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(poller.run(shutdown.clone()));

        rx.changed().await.unwrap();
        shutdown.cancel();
        handle.await.unwrap();
    }

    struct HangingBalance;

    #[async_trait]
    impl BalanceSource for HangingBalance {
        async fn native_balance(
            &self,
            _network: &NetworkConfig,
            _wallet: Address,
        ) -> Result<U256, ChainClientError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancel_interrupts_a_hung_fetch() {
        let (poller, rx) = BalancePoller::new(
            Arc::new(HangingBalance),
            SEPOLIA,
            Address::ZERO,
            DEFAULT_BALANCE_INTERVAL,
        );
        let shutdown = CancellationToken::new();
        let handle = tokio::spawn(poller.run(shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("poller should stop while the fetch is pending")
            .unwrap();
        assert!(rx.borrow().is_loading());
    }
}
