// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Display formatting for native-asset and fiat amounts.

use alloy::primitives::U256;

/// Native asset base units per whole unit (wei per ETH).
pub const WEI_PER_ETH: f64 = 1e18;

/// Convert a wei amount to ETH for display and fiat conversion.
pub fn wei_to_eth(wei: U256) -> f64 {
    // A decimal integer string always parses; values beyond f64 range become inf.
    wei.to_string().parse::<f64>().unwrap_or(f64::INFINITY) / WEI_PER_ETH
}

/// Format an ETH amount with two significant digits past its leading digit.
///
/// The number of decimals follows the order of magnitude so that tiny testnet
/// fees (e.g. `0.0000031`) stay visible instead of rounding to zero.
pub fn format_eth_value(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let exponent = order_of_magnitude(value);
    let decimal_places = (1 - exponent).max(0) as usize + 1;

    format!("{value:.decimal_places$}")
}

/// Exponent of the shortest scientific representation of `value`.
fn order_of_magnitude(value: f64) -> i32 {
    let scientific = format!("{value:e}");
    scientific
        .rsplit_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

/// Format a fiat amount in USD.
pub fn format_usd(value: f64) -> String {
    format!("${value:.2}")
}

/// Format a wei amount as `"<value> ETH"` using [`format_eth_value`].
pub fn format_eth_amount(wei: U256) -> String {
    format!("{} ETH", format_eth_value(wei_to_eth(wei)))
}

/// Shorten a hash or address to `0x1234...abcd`.
pub fn shorten_hash(hash: &str, chars: usize) -> String {
    if hash.len() <= chars * 2 + 2 || !hash.is_ascii() {
        return hash.to_string();
    }
    format!("{}...{}", &hash[..chars + 2], &hash[hash.len() - chars..])
}
