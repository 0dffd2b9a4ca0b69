// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Price and Balance Feeds
//!
//! Background pollers that keep the native asset's USD price and a wallet's
//! native balance fresh. Each poller publishes a [`Reading`] on a
//! `tokio::sync::watch` channel; consumers only ever look at the latest value
//! and never drive the polling themselves.
//!
//! A failed fetch publishes [`Reading::Unavailable`] rather than a stale or
//! zero value, so downstream checks can treat "unknown" explicitly.

pub mod balance;
pub mod price;

use serde::Serialize;

pub use balance::{BalancePoller, BalanceSource, RpcBalanceSource, DEFAULT_BALANCE_INTERVAL};
pub use price::{
    CoinGeckoClient, PriceFeedError, PricePoller, PriceSource, DEFAULT_PRICE_INTERVAL,
};

/// Latest observation of an externally owned value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Reading<T> {
    /// No value fetched yet.
    Loading,
    /// Value from the most recent successful fetch.
    Ready(T),
    /// The most recent fetch failed.
    Unavailable,
}

impl<T> Reading<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Ready(value) => Some(value),
            Reading::Loading | Reading::Unavailable => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Reading::Loading)
    }
}

impl<T, E> From<Result<T, E>> for Reading<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Reading::Ready(value),
            Err(_) => Reading::Unavailable,
        }
    }
}
