// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM testnet integration.
//!
//! This module provides functionality for:
//! - The registry of supported networks
//! - Querying native balances and ERC-20 metadata
//! - Pricing cross-chain deployment legs

pub mod client;
pub mod erc20;
pub mod gas;
pub mod metadata;
pub mod token_cache;
pub mod types;

pub use client::{format_balance, parse_address, ChainClientError, EvmClient};
pub use gas::{AxelarGasEstimator, EstimateLeg, GasEstimateError, GasEstimator};
pub use metadata::{CachedTokenReader, TokenMetadataSource};
pub use token_cache::TokenCache;
pub use types::*;
