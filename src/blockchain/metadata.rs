// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 metadata lookups for the register flow.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::client::{ChainClientError, EvmClient};
use super::token_cache::TokenCache;
use super::types::{NetworkConfig, TokenMetadata};

const CACHE_CAPACITY: usize = 256;
const CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[async_trait]
pub trait TokenMetadataSource: Send + Sync {
    async fn token_metadata(
        &self,
        network: &NetworkConfig,
        token_address: &str,
    ) -> Result<TokenMetadata, ChainClientError>;
}

/// Reads metadata over RPC, remembering results per network and address.
pub struct CachedTokenReader {
    cache: Arc<TokenCache>,
}

impl CachedTokenReader {
    pub fn new(cache: Arc<TokenCache>) -> Self {
        Self { cache }
    }
}

impl Default for CachedTokenReader {
    fn default() -> Self {
        Self::new(Arc::new(TokenCache::new(CACHE_CAPACITY, CACHE_TTL)))
    }
}

#[async_trait]
impl TokenMetadataSource for CachedTokenReader {
    async fn token_metadata(
        &self,
        network: &NetworkConfig,
        token_address: &str,
    ) -> Result<TokenMetadata, ChainClientError> {
        if let Some(metadata) = self.cache.get(network.id, token_address) {
            debug!(chain_id = network.id, token = %token_address, "Token metadata cache hit");
            return Ok(metadata);
        }

        let metadata = EvmClient::new(*network)?
            .get_token_metadata(token_address)
            .await?;
        self.cache.put(network.id, token_address, metadata.clone());
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::SEPOLIA;

    #[tokio::test]
    async fn cached_metadata_skips_rpc() {
        let cache = Arc::new(TokenCache::new(4, Duration::from_secs(60)));
        let metadata = TokenMetadata {
            address: "0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63".to_string(),
            name: "MyToken".to_string(),
            symbol: "MTK".to_string(),
            decimals: 18,
            total_supply: "1000000".to_string(),
        };
        cache.put(SEPOLIA.id, &metadata.address, metadata.clone());

        let reader = CachedTokenReader::new(cache);
        let found = reader
            .token_metadata(&SEPOLIA, "0x76568bed5acf1a5cd888773c8cae9ea2a9131a63")
            .await
            .unwrap();
        assert_eq!(found, metadata);
    }
}
