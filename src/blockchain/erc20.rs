// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 metadata reads for tokens being registered cross-chain.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::client::{parse_address, ChainClientError};

sol! {
    #[sol(rpc)]
    interface IERC20Metadata {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20Metadata::IERC20MetadataInstance<P>,
    address: Address,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Create a new ERC-20 contract instance.
    pub fn new(provider: &P, contract_address: &str) -> Result<Self, ChainClientError> {
        let address = parse_address(contract_address)?;
        let contract = IERC20Metadata::new(address, provider.clone());

        Ok(Self { contract, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn name(&self) -> Result<String, ChainClientError> {
        self.contract
            .name()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    pub async fn symbol(&self) -> Result<String, ChainClientError> {
        self.contract
            .symbol()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    pub async fn decimals(&self) -> Result<u8, ChainClientError> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }

    pub async fn total_supply(&self) -> Result<U256, ChainClientError> {
        self.contract
            .totalSupply()
            .call()
            .await
            .map_err(|e| ChainClientError::ContractError(e.to_string()))
    }
}
