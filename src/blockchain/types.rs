// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Supported networks and chain-level types.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// EVM network configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Chain ID
    pub id: u64,
    /// Network name for display
    pub name: &'static str,
    /// RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
    /// Chain ID as hex, as used by `wallet_switchEthereumChain`
    pub chain_id_hex: &'static str,
}

impl NetworkConfig {
    /// Explorer link for a token contract.
    pub fn token_url(&self, address: &str) -> String {
        format!("{}/token/{address}", self.explorer_url)
    }
}

/// Ethereum Sepolia testnet configuration.
pub const SEPOLIA: NetworkConfig = NetworkConfig {
    id: 11_155_111,
    name: "Sepolia",
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
    chain_id_hex: "0xaa36a7",
};

/// Base Sepolia testnet configuration.
pub const BASE_SEPOLIA: NetworkConfig = NetworkConfig {
    id: 84_532,
    name: "Base Sepolia",
    rpc_url: "https://sepolia.base.org",
    explorer_url: "https://sepolia.basescan.org",
    chain_id_hex: "0x14a34",
};

/// Optimism Sepolia testnet configuration.
pub const OPTIMISM_SEPOLIA: NetworkConfig = NetworkConfig {
    id: 11_155_420,
    name: "Optimism Sepolia",
    rpc_url: "https://sepolia.optimism.io",
    explorer_url: "https://sepolia-optimism.etherscan.io",
    chain_id_hex: "0xaa37dc",
};

/// Networks offered by the launchpad.
pub const SUPPORTED_NETWORKS: [NetworkConfig; 3] = [SEPOLIA, BASE_SEPOLIA, OPTIMISM_SEPOLIA];

/// Map a network display name to the chain identifier expected by the
/// interchain gas service.
///
/// The lookup is exhaustive on purpose: a registry entry without a mapping is
/// a configuration mismatch and must not silently fall back to another chain.
pub fn gas_service_chain_name(network_name: &str) -> Result<&'static str, NetworkError> {
    match network_name.trim().to_ascii_lowercase().as_str() {
        "sepolia" => Ok("ethereum-sepolia"),
        "base sepolia" => Ok("base-sepolia"),
        "optimism sepolia" => Ok("optimism-sepolia"),
        _ => Err(NetworkError::Unsupported(network_name.to_string())),
    }
}

/// Read-only registry of networks, looked up by chain ID.
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    networks: Vec<NetworkConfig>,
}

impl NetworkRegistry {
    pub fn new(networks: Vec<NetworkConfig>) -> Self {
        Self { networks }
    }

    pub fn all(&self) -> &[NetworkConfig] {
        &self.networks
    }

    pub fn get(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| n.id == chain_id)
    }

    pub fn require(&self, chain_id: u64) -> Result<&NetworkConfig, NetworkError> {
        self.get(chain_id).ok_or(NetworkError::UnknownChain(chain_id))
    }

    /// Every network except `source_id`, in registry order.
    pub fn destinations_for(&self, source_id: u64) -> impl Iterator<Item = &NetworkConfig> {
        self.networks.iter().filter(move |n| n.id != source_id)
    }
}

impl Default for NetworkRegistry {
    fn default() -> Self {
        Self::new(SUPPORTED_NETWORKS.to_vec())
    }
}

/// Public description of a network.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NetworkInfo {
    pub id: u64,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub chain_id_hex: String,
}

impl From<&NetworkConfig> for NetworkInfo {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            id: network.id,
            name: network.name.to_string(),
            rpc_url: network.rpc_url.to_string(),
            explorer_url: network.explorer_url.to_string(),
            chain_id_hex: network.chain_id_hex.to_string(),
        }
    }
}

/// ERC-20 metadata read from chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenMetadata {
    /// Contract address (checksummed)
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Total supply formatted with `decimals`
    pub total_supply: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    #[error("Unsupported chain: {0}")]
    Unsupported(String),

    #[error("Unknown chain ID: {0}")]
    UnknownChain(u64),
}
