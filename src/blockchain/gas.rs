// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-chain gas estimation.
//!
//! A deployment leg pays for execution on the destination chain up front, in
//! the source chain's native asset. The estimate comes from the Axelar GMP
//! API (`estimateGasFee`), which prices the destination gas limit with the
//! current gas prices and token exchange rate of both chains.

use std::time::Duration;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

/// Destination gas budget for deploying a brand-new interchain token.
const DEPLOY_TOKEN_GAS_LIMIT: u64 = 700_000;

/// Destination gas budget for linking an existing token (token manager deploy).
const REGISTER_TOKEN_GAS_LIMIT: u64 = 500_000;

/// One source → destination leg to price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateLeg {
    /// Gas-service identifier of the source chain (e.g. `ethereum-sepolia`)
    pub source_chain: &'static str,
    /// Gas-service identifier of the destination chain
    pub destination_chain: &'static str,
    /// Existing token being registered; `None` for a new deployment
    pub token_address: Option<Address>,
}

impl EstimateLeg {
    fn gas_limit(&self) -> u64 {
        match self.token_address {
            Some(_) => REGISTER_TOKEN_GAS_LIMIT,
            None => DEPLOY_TOKEN_GAS_LIMIT,
        }
    }
}

/// Prices a deployment leg in base units (wei) of the source chain's native asset.
#[async_trait]
pub trait GasEstimator: Send + Sync {
    async fn estimate(&self, leg: &EstimateLeg) -> Result<U256, GasEstimateError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EstimateGasFeeRequest {
    method: &'static str,
    source_chain: &'static str,
    destination_chain: &'static str,
    gas_limit: String,
    gas_multiplier: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_token_address: Option<String>,
}

impl From<&EstimateLeg> for EstimateGasFeeRequest {
    fn from(leg: &EstimateLeg) -> Self {
        Self {
            method: "estimateGasFee",
            source_chain: leg.source_chain,
            destination_chain: leg.destination_chain,
            gas_limit: leg.gas_limit().to_string(),
            gas_multiplier: "auto",
            source_token_address: leg.token_address.map(|a| a.to_checksum(None)),
        }
    }
}

/// [`GasEstimator`] backed by the Axelar GMP HTTP API.
pub struct AxelarGasEstimator {
    endpoint: String,
    http: Client,
}

impl AxelarGasEstimator {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, GasEstimateError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| GasEstimateError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            http,
        })
    }
}

#[async_trait]
impl GasEstimator for AxelarGasEstimator {
    async fn estimate(&self, leg: &EstimateLeg) -> Result<U256, GasEstimateError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&EstimateGasFeeRequest::from(leg))
            .send()
            .await
            .map_err(|e| GasEstimateError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GasEstimateError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GasEstimateError::Rejected(format!(
                "gas service returned {status}: {body}"
            )));
        }

        parse_fee(&body)
    }
}

/// Parse a fee response: a bare or JSON-quoted decimal wei amount.
fn parse_fee(body: &str) -> Result<U256, GasEstimateError> {
    let raw = body.trim().trim_matches('"');
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GasEstimateError::InvalidResponse(body.to_string()));
    }
    raw.parse::<U256>()
        .map_err(|_| GasEstimateError::InvalidResponse(body.to_string()))
}

/// Errors returned by a gas estimator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GasEstimateError {
    #[error("Gas service unreachable: {0}")]
    Transport(String),

    #[error("Gas estimate rejected: {0}")]
    Rejected(String),

    #[error("Invalid gas estimate response: {0}")]
    InvalidResponse(String),

    #[error("Gas estimate timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn request_for_new_token() {
        let leg = EstimateLeg {
            source_chain: "ethereum-sepolia",
            destination_chain: "base-sepolia",
            token_address: None,
        };
        let body = serde_json::to_value(EstimateGasFeeRequest::from(&leg)).unwrap();
        assert_eq!(body["method"], "estimateGasFee");
        assert_eq!(body["sourceChain"], "ethereum-sepolia");
        assert_eq!(body["destinationChain"], "base-sepolia");
        assert_eq!(body["gasLimit"], "700000");
        assert!(body.get("sourceTokenAddress").is_none());
    }

    #[test]
    fn request_for_existing_token() {
        let leg = EstimateLeg {
            source_chain: "base-sepolia",
            destination_chain: "optimism-sepolia",
            token_address: Some(address!("76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63")),
        };
        let body = serde_json::to_value(EstimateGasFeeRequest::from(&leg)).unwrap();
        assert_eq!(body["gasLimit"], "500000");
        assert_eq!(
            body["sourceTokenAddress"],
            "0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63"
        );
    }

    #[test]
    fn parse_fee_accepts_plain_and_quoted() {
        assert_eq!(parse_fee("1000000000000").unwrap(), U256::from(1_000_000_000_000u64));
        assert_eq!(parse_fee("\"42\"\n").unwrap(), U256::from(42u64));
    }

    #[test]
    fn parse_fee_rejects_non_numeric() {
        assert!(matches!(
            parse_fee("{\"error\":\"chain not found\"}"),
            Err(GasEstimateError::InvalidResponse(_))
        ));
        assert!(parse_fee("").is_err());
        assert!(parse_fee("-5").is_err());
    }
}
