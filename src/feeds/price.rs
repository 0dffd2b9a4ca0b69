// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Native asset (ETH) USD price feed.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::Reading;

/// Default interval between price refreshes.
pub const DEFAULT_PRICE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Source of the native asset's USD unit price.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn native_usd_price(&self) -> Result<f64, PriceFeedError>;
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    ethereum: UsdQuote,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    usd: f64,
}

/// CoinGecko `simple/price` client.
pub struct CoinGeckoClient {
    url: String,
    http: Client,
}

impl CoinGeckoClient {
    pub fn new(url: impl Into<String>) -> Result<Self, PriceFeedError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PriceFeedError::Fetch(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn native_usd_price(&self) -> Result<f64, PriceFeedError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| PriceFeedError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PriceFeedError::Fetch(format!(
                "HTTP {} from price endpoint",
                response.status()
            )));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| PriceFeedError::InvalidResponse(e.to_string()))?;

        validate_price(body.ethereum.usd)
    }
}

fn validate_price(price: f64) -> Result<f64, PriceFeedError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(PriceFeedError::InvalidResponse(format!(
            "non-positive price {price}"
        )))
    }
}

/// Background poller publishing the latest USD price.
pub struct PricePoller {
    source: Arc<dyn PriceSource>,
    poll_interval: Duration,
    tx: watch::Sender<Reading<f64>>,
}

impl PricePoller {
    /// Create a poller and the receiver its readings are published on.
    pub fn new(
        source: Arc<dyn PriceSource>,
        poll_interval: Duration,
    ) -> (Self, watch::Receiver<Reading<f64>>) {
        let (tx, rx) = watch::channel(Reading::Loading);
        (
            Self {
                source,
                poll_interval,
                tx,
            },
            rx,
        )
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Price poller starting"
        );

        loop {
            tokio::select! {
                _ = self.poll_step() => {},
                _ = shutdown.cancelled() => {
                    info!("Price poller shutting down");
                    return;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Price poller shutting down");
                    return;
                }
            }
        }
    }

    async fn poll_step(&self) {
        let reading = match self.source.native_usd_price().await {
            Ok(price) => {
                debug!(price_usd = price, "Price poller: refreshed");
                Reading::Ready(price)
            }
            Err(e) => {
                warn!(error = %e, "Price poller: fetch failed");
                Reading::Unavailable
            }
        };
        self.tx.send_replace(reading);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PriceFeedError {
    #[error("Failed to fetch price: {0}")]
    Fetch(String),

    #[error("Invalid price response: {0}")]
    InvalidResponse(String),
}
