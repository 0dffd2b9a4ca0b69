// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use tokio::sync::{watch, RwLock};
use tracing::warn;

use crate::blockchain::{
    CachedTokenReader, GasEstimator, NetworkConfig, NetworkRegistry, TokenMetadata,
    TokenMetadataSource,
};
use crate::config::LaunchpadConfig;
use crate::feeds::{BalancePoller, BalanceSource, Reading, RpcBalanceSource};
use crate::intents::IntentStore;
use crate::notify::Notification;
use crate::store::SessionStore;
use crate::wizard::{Flow, WizardContext, WizardError, WizardSession};

/// Shared handles for the HTTP layer.
#[derive(Clone)]
pub struct AppState {
    pub registry: NetworkRegistry,
    pub price: watch::Receiver<Reading<f64>>,
    pub gas: Arc<dyn GasEstimator>,
    pub balances: Arc<dyn BalanceSource>,
    pub tokens: Arc<dyn TokenMetadataSource>,
    pub intents: Arc<IntentStore>,
    pub sessions: Arc<RwLock<SessionStore>>,
    pub balance_refresh: Duration,
    pub estimate_timeout: Duration,
}

impl AppState {
    /// State backed by the real RPC balance and metadata readers.
    pub fn new(
        config: &LaunchpadConfig,
        price: watch::Receiver<Reading<f64>>,
        gas: Arc<dyn GasEstimator>,
    ) -> Self {
        Self {
            registry: NetworkRegistry::default(),
            price,
            gas,
            balances: Arc::new(RpcBalanceSource),
            tokens: Arc::new(CachedTokenReader::default()),
            intents: Arc::new(IntentStore::new()),
            sessions: Arc::new(RwLock::new(SessionStore::with_idle_ttl(
                config.session_idle_ttl,
            ))),
            balance_refresh: config.balance_refresh,
            estimate_timeout: config.estimate_timeout,
        }
    }

    /// Open a wizard session and start polling the wallet's balance on the
    /// source network for as long as the session stays open.
    pub async fn open_wizard(
        &self,
        flow: Flow,
        source_chain_id: u64,
        wallet: Address,
    ) -> Result<Arc<WizardSession>, WizardError> {
        let source = *self.registry.require(source_chain_id)?;
        let token = match flow.token_address() {
            Some(address) => self.token_metadata(&source, address).await,
            None => None,
        };

        let (poller, balance) =
            BalancePoller::new(self.balances.clone(), source, wallet, self.balance_refresh);
        let ctx = self.wizard_context(balance);
        let token_missing = flow.token_address().is_some() && token.is_none();
        let session = WizardSession::open(flow, source_chain_id, wallet, token, ctx)?;

        tokio::spawn(poller.run(session.liveness()));

        if token_missing {
            session
                .notify(Notification::info(format!(
                    "Token details could not be loaded from {}",
                    source.name
                )))
                .await;
        }

        let mut sessions = self.sessions.write().await;
        sessions.sweep_idle();
        sessions.insert(session.clone());
        Ok(session)
    }

    fn wizard_context(&self, balance: watch::Receiver<Reading<U256>>) -> WizardContext {
        WizardContext {
            registry: self.registry.clone(),
            gas: self.gas.clone(),
            submissions: self.intents.clone(),
            price: self.price.clone(),
            balance,
            estimate_timeout: self.estimate_timeout,
        }
    }

    async fn token_metadata(
        &self,
        network: &NetworkConfig,
        address: Address,
    ) -> Option<TokenMetadata> {
        let address = address.to_checksum(None);
        match self.tokens.token_metadata(network, &address).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(
                    chain_id = network.id,
                    token = %address,
                    error = %e,
                    "Could not read token metadata"
                );
                None
            }
        }
    }

    /// Close every open session.
    pub async fn close_sessions(&self) {
        self.sessions.write().await.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{ChainClientError, EstimateLeg, GasEstimateError, SEPOLIA};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoGas;

    #[async_trait]
    impl GasEstimator for NoGas {
        async fn estimate(&self, _leg: &EstimateLeg) -> Result<U256, GasEstimateError> {
            Err(GasEstimateError::Rejected("unused".into()))
        }
    }

    #[derive(Default)]
    struct CountingBalance(AtomicUsize);

    #[async_trait]
    impl BalanceSource for CountingBalance {
        async fn native_balance(
            &self,
            _network: &NetworkConfig,
            _wallet: Address,
        ) -> Result<U256, ChainClientError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(U256::from(1u64))
        }
    }

    struct MissingToken;

    #[async_trait]
    impl TokenMetadataSource for MissingToken {
        async fn token_metadata(
            &self,
            network: &NetworkConfig,
            _token_address: &str,
        ) -> Result<TokenMetadata, ChainClientError> {
            Err(ChainClientError::Timeout {
                network: network.name,
                after: Duration::from_secs(10),
            })
        }
    }

    fn state(balances: Arc<CountingBalance>, idle_ttl: Duration) -> AppState {
        let (_, price) = watch::channel(Reading::Ready(2500.0));
        AppState {
            registry: NetworkRegistry::default(),
            price,
            gas: Arc::new(NoGas),
            balances,
            tokens: Arc::new(MissingToken),
            intents: Arc::new(IntentStore::new()),
            sessions: Arc::new(RwLock::new(SessionStore::with_idle_ttl(idle_ttl))),
            balance_refresh: Duration::from_millis(10),
            estimate_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn idle_session_stops_polling_once_swept() {
        let balances = Arc::new(CountingBalance::default());
        let state = state(balances.clone(), Duration::from_millis(50));
        let session = state
            .open_wizard(Flow::Deploy, SEPOLIA.id, Address::repeat_byte(0x07))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(balances.0.load(Ordering::SeqCst) > 0);

        assert_eq!(state.sessions.write().await.sweep_idle(), 1);
        assert!(!session.is_open());
        assert!(state.sessions.read().await.is_empty());

        tokio::time::sleep(Duration::from_millis(30)).await;
        let settled = balances.0.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(balances.0.load(Ordering::SeqCst), settled);
    }

    #[tokio::test]
    async fn unreadable_token_is_reported_on_open() {
        let state = state(Arc::new(CountingBalance::default()), Duration::from_secs(60));
        let flow = Flow::Register {
            token_address: Address::repeat_byte(0x42),
        };
        let session = state
            .open_wizard(flow, SEPOLIA.id, Address::repeat_byte(0x08))
            .await
            .unwrap();

        assert!(session.view().await.token.is_none());
        let notes = session.drain_notifications().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, crate::notify::NotificationLevel::Info);
        assert_eq!(notes[0].message, "Token details could not be loaded from Sepolia");
        session.close();
    }
}
