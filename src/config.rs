// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `PRICE_API_URL` | ETH/USD simple-price endpoint | CoinGecko |
//! | `GAS_API_URL` | Cross-chain gas estimation endpoint | Axelar GMP testnet |
//! | `PRICE_REFRESH_SECS` | Price poll interval | `300` |
//! | `BALANCE_REFRESH_SECS` | Balance poll interval | `30` |
//! | `ESTIMATE_TIMEOUT_SECS` | Upper bound on one gas estimate | `30` |
//! | `SESSION_IDLE_SECS` | Idle time before a wizard session is closed | `900` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use tracing::warn;

use crate::feeds::{DEFAULT_BALANCE_INTERVAL, DEFAULT_PRICE_INTERVAL};
use crate::store::DEFAULT_SESSION_IDLE_TTL;
use crate::wizard::DEFAULT_ESTIMATE_TIMEOUT;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the price endpoint.
///
/// Must answer with `{"ethereum": {"usd": <number>}}`.
pub const PRICE_API_URL_ENV: &str = "PRICE_API_URL";

/// Environment variable name for the gas estimation endpoint.
pub const GAS_API_URL_ENV: &str = "GAS_API_URL";

pub const PRICE_REFRESH_SECS_ENV: &str = "PRICE_REFRESH_SECS";
pub const BALANCE_REFRESH_SECS_ENV: &str = "BALANCE_REFRESH_SECS";
pub const ESTIMATE_TIMEOUT_SECS_ENV: &str = "ESTIMATE_TIMEOUT_SECS";

/// Environment variable name for the wizard session idle TTL.
///
/// A session no request has touched for this long is closed and its balance
/// poller stopped.
pub const SESSION_IDLE_SECS_ENV: &str = "SESSION_IDLE_SECS";

/// Environment variable name for the log output format.
///
/// `json` selects structured JSON lines; anything else is human readable.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PRICE_API_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=ethereum&vs_currencies=usd";
pub const DEFAULT_GAS_API_URL: &str = "https://testnet.api.gmp.axelarscan.io";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` on its own, before logging is installed.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LaunchpadConfig {
    pub host: String,
    pub port: u16,
    pub price_api_url: String,
    pub gas_api_url: String,
    pub price_refresh: Duration,
    pub balance_refresh: Duration,
    pub estimate_timeout: Duration,
    pub session_idle_ttl: Duration,
    pub log_format: LogFormat,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            price_api_url: DEFAULT_PRICE_API_URL.to_string(),
            gas_api_url: DEFAULT_GAS_API_URL.to_string(),
            price_refresh: DEFAULT_PRICE_INTERVAL,
            balance_refresh: DEFAULT_BALANCE_INTERVAL,
            estimate_timeout: DEFAULT_ESTIMATE_TIMEOUT,
            session_idle_ttl: DEFAULT_SESSION_IDLE_TTL,
            log_format: LogFormat::Pretty,
        }
    }
}

impl LaunchpadConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let text = |name: &str, default: String| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        Self {
            host: text(HOST_ENV, defaults.host),
            port: parse_or(&lookup, PORT_ENV, defaults.port),
            price_api_url: text(PRICE_API_URL_ENV, defaults.price_api_url),
            gas_api_url: text(GAS_API_URL_ENV, defaults.gas_api_url),
            price_refresh: seconds_or(&lookup, PRICE_REFRESH_SECS_ENV, defaults.price_refresh),
            balance_refresh: seconds_or(
                &lookup,
                BALANCE_REFRESH_SECS_ENV,
                defaults.balance_refresh,
            ),
            estimate_timeout: seconds_or(
                &lookup,
                ESTIMATE_TIMEOUT_SECS_ENV,
                defaults.estimate_timeout,
            ),
            session_idle_ttl: seconds_or(
                &lookup,
                SESSION_IDLE_SECS_ENV,
                defaults.session_idle_ttl,
            ),
            log_format: LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How often idle sessions are looked for.
    pub fn session_sweep_interval(&self) -> Duration {
        self.session_idle_ttl / 4
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(
                variable = name,
                value = %raw,
                default = %default,
                "Invalid value, using default"
            );
            default
        }),
    }
}

fn seconds_or(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: Duration) -> Duration {
    match parse_or(lookup, name, default.as_secs()) {
        0 => {
            warn!(variable = name, "Interval must be positive, using default");
            default
        }
        secs => Duration::from_secs(secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> LaunchpadConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LaunchpadConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
        assert_eq!(cfg.gas_api_url, DEFAULT_GAS_API_URL);
        assert_eq!(cfg.price_refresh, Duration::from_secs(300));
        assert_eq!(cfg.balance_refresh, Duration::from_secs(30));
        assert_eq!(cfg.estimate_timeout, Duration::from_secs(30));
        assert_eq!(cfg.session_idle_ttl, Duration::from_secs(900));
        assert_eq!(cfg.session_sweep_interval(), Duration::from_secs(225));
        assert_eq!(cfg.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = config(&[
            (PORT_ENV, "9000"),
            (GAS_API_URL_ENV, "http://localhost:4000"),
            (BALANCE_REFRESH_SECS_ENV, "5"),
            (SESSION_IDLE_SECS_ENV, "60"),
            (LOG_FORMAT_ENV, "JSON"),
        ]);
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.gas_api_url, "http://localhost:4000");
        assert_eq!(cfg.balance_refresh, Duration::from_secs(5));
        assert_eq!(cfg.session_idle_ttl, Duration::from_secs(60));
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn malformed_values_fall_back() {
        let cfg = config(&[
            (PORT_ENV, "eighty"),
            (PRICE_REFRESH_SECS_ENV, "0"),
            (ESTIMATE_TIMEOUT_SECS_ENV, "-1"),
            (HOST_ENV, "  "),
        ]);
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.price_refresh, DEFAULT_PRICE_INTERVAL);
        assert_eq!(cfg.estimate_timeout, DEFAULT_ESTIMATE_TIMEOUT);
        assert_eq!(cfg.host, DEFAULT_HOST);
    }
}
