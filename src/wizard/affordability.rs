// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gas cost versus wallet balance.
//!
//! The check is recomputed from the latest readings every time it is asked
//! for and never cached. It fails closed: while either the balance or the
//! price is loading or unavailable, the result is [`Affordability::Unknown`],
//! which blocks advancement exactly like an insufficient balance.

use alloy::primitives::U256;

use crate::feeds::Reading;
use crate::format::wei_to_eth;

/// Snapshot of the collaborator readings the wizard depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Funds {
    /// Wallet native balance on the source network, in wei
    pub balance: Reading<U256>,
    /// Native asset unit price in USD
    pub price_usd: Reading<f64>,
}

impl Funds {
    pub fn new(balance: Reading<U256>, price_usd: Reading<f64>) -> Self {
        Self { balance, price_usd }
    }

    /// Fiat value of a wei amount, when the price is known.
    pub fn usd_value(&self, wei: U256) -> Option<f64> {
        self.price_usd.value().map(|price| wei_to_eth(wei) * price)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordability {
    Affordable,
    Insufficient { shortfall: U256 },
    Unknown,
}

impl Affordability {
    pub fn check(total_cost: U256, funds: &Funds) -> Self {
        let (Some(balance), Some(_price)) = (funds.balance.value(), funds.price_usd.value()) else {
            return Affordability::Unknown;
        };

        if *balance >= total_cost {
            Affordability::Affordable
        } else {
            Affordability::Insufficient {
                shortfall: total_cost - *balance,
            }
        }
    }

    pub fn is_affordable(&self) -> bool {
        matches!(self, Affordability::Affordable)
    }
}
