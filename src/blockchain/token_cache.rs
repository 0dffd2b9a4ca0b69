// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for ERC-20 metadata lookups.
//!
//! Registering the same token on several chains re-opens the wizard with the
//! same address, so metadata reads are cached per `(chain_id, address)`.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use super::types::TokenMetadata;

struct CacheEntry {
    metadata: TokenMetadata,
    inserted_at: Instant,
}

/// In-process LRU cache of token metadata.
pub struct TokenCache {
    cache: Mutex<LruCache<(u64, String), CacheEntry>>,
    ttl: Duration,
}

impl TokenCache {
    /// Create a new cache with the given capacity and TTL.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            ttl,
        }
    }

    /// Returns `None` if not cached or expired.
    pub fn get(&self, chain_id: u64, token_address: &str) -> Option<TokenMetadata> {
        let key = (chain_id, token_address.to_lowercase());
        let mut cache = self.cache.lock().ok()?;
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.metadata.clone());
            }
            cache.pop(&key);
        }
        None
    }

    pub fn put(&self, chain_id: u64, token_address: &str, metadata: TokenMetadata) {
        let key = (chain_id, token_address.to_lowercase());
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(
                key,
                CacheEntry {
                    metadata,
                    inserted_at: Instant::now(),
                },
            );
        }
    }
}
