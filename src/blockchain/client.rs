// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only EVM client for the supported testnets.

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use alloy::{
    network::Ethereum,
    primitives::{Address, U256},
    providers::{
        fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
        Identity, Provider, ProviderBuilder, RootProvider,
    },
};

use super::erc20::Erc20Contract;
use super::types::*;

/// Upper bound on one read against a network's RPC endpoint.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP provider type (with the default fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// EVM JSON-RPC client bound to one network.
pub struct EvmClient {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider
    provider: HttpProvider,
    timeout: Duration,
}

impl EvmClient {
    /// Create a new client for the specified network.
    pub fn new(network: NetworkConfig) -> Result<Self, ChainClientError> {
        let url: url::Url = network.rpc_url.parse().map_err(|e: url::ParseError| {
            ChainClientError::InvalidRpcUrl(e.to_string())
        })?;

        let provider = ProviderBuilder::new().connect_http(url);

        Ok(Self {
            network,
            provider,
            timeout: RPC_TIMEOUT,
        })
    }

    /// Override the per-read timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the native balance (wei) for an address.
    pub async fn get_native_balance(&self, address: Address) -> Result<U256, ChainClientError> {
        self.bounded(async {
            self.provider
                .get_balance(address)
                .await
                .map_err(|e| ChainClientError::RpcError(format!("{}: {e}", self.network.name)))
        })
        .await
    }

    /// Read name, symbol, decimals and total supply of an ERC-20 contract.
    pub async fn get_token_metadata(
        &self,
        token_address: &str,
    ) -> Result<TokenMetadata, ChainClientError> {
        let contract = Erc20Contract::new(&self.provider, token_address)?;

        self.bounded(async {
            let name = contract.name().await?;
            let symbol = contract.symbol().await?;
            let decimals = contract.decimals().await?;
            let total_supply = contract.total_supply().await?;

            Ok(TokenMetadata {
                address: contract.address().to_checksum(None),
                name,
                symbol,
                decimals,
                total_supply: format_balance(total_supply, decimals),
            })
        })
        .await
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, ChainClientError>>,
    ) -> Result<T, ChainClientError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ChainClientError::Timeout {
                network: self.network.name,
                after: self.timeout,
            })?
    }
}

/// Parse a `0x`-prefixed address.
pub fn parse_address(raw: &str) -> Result<Address, ChainClientError> {
    Address::from_str(raw.trim()).map_err(|e| ChainClientError::InvalidAddress(e.to_string()))
}

/// Format a balance with the specified number of decimals.
pub fn format_balance(balance: U256, decimals: u8) -> String {
    if balance.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = balance / divisor;
    let remainder = balance % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        // Format with up to 6 decimal places
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, &trimmed[..trimmed.len().min(6)])
        }
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainClientError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("{network} RPC did not answer within {after:?}")]
    Timeout {
        network: &'static str,
        after: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_balance() {
        // 1 ETH = 1e18 wei
        let one_eth = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_balance(one_eth, 18), "1");

        let half_eth = U256::from(500_000_000_000_000_000u64);
        assert_eq!(format_balance(half_eth, 18), "0.5");

        // truncated to 6 decimals
        let complex = U256::from(1_234_567_890_000_000_000u64);
        assert_eq!(format_balance(complex, 18), "1.234567");

        assert_eq!(format_balance(U256::ZERO, 18), "0");

        // 1,000,000 tokens with 18 decimals
        let supply = U256::from(1_000_000u64) * U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(format_balance(supply, 18), "1000000");
    }

    #[test]
    fn parse_address_rejects_garbage() {
        assert!(parse_address("0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63").is_ok());
        assert!(matches!(
            parse_address("not-an-address"),
            Err(ChainClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn client_rejects_bad_rpc_url() {
        let network = NetworkConfig {
            rpc_url: "not a url",
            ..SEPOLIA
        };
        assert!(matches!(
            EvmClient::new(network),
            Err(ChainClientError::InvalidRpcUrl(_))
        ));
    }

    #[tokio::test]
    async fn silent_rpc_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let rpc_url: &'static str =
            Box::leak(format!("http://{}", listener.local_addr().unwrap()).into_boxed_str());
        // Accept connections and never answer.
        let _hold = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let client = EvmClient::new(NetworkConfig { rpc_url, ..SEPOLIA })
            .unwrap()
            .with_timeout(Duration::from_millis(50));

        assert!(matches!(
            client.get_native_balance(Address::ZERO).await,
            Err(ChainClientError::Timeout { network: "Sepolia", .. })
        ));
        assert!(matches!(
            client
                .get_token_metadata("0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63")
                .await,
            Err(ChainClientError::Timeout { .. })
        ));
    }
}
