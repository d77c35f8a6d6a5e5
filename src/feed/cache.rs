//! Feed Cache Module
//!
//! Short-lived cache of assembled feed pages. Purely derived state: entries
//! expire on their own and dropping one only forces a recomputation, never
//! corruption.

use std::collections::HashMap;

use serde::Serialize;

use crate::clock::now_ms;
use crate::feed::FeedPage;

// == Cache Entry ==
#[derive(Debug, Clone)]
struct CacheEntry {
    page: FeedPage,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: i64,
}

impl CacheEntry {
    /// An entry is expired once the current time reaches its expiry.
    fn is_expired(&self) -> bool {
        now_ms() >= self.expires_at
    }
}

// == Cache Stats ==
/// Feed cache performance counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub entries: usize,
}

// == Feed Cache ==
/// TTL-expiring map from cache key to assembled [`FeedPage`].
#[derive(Debug)]
pub struct FeedCache {
    entries: HashMap<String, CacheEntry>,
    ttl_ms: i64,
    hits: u64,
    misses: u64,
    expired: u64,
}

impl FeedCache {
    // == Constructor ==
    /// Creates an empty cache whose entries live `ttl_secs` seconds.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms: ttl_secs as i64 * 1000,
            hits: 0,
            misses: 0,
            expired: 0,
        }
    }

    // == Get ==
    /// Returns the cached page for `key` if present and fresh. Expired
    /// entries are dropped on access and counted as misses.
    pub fn get(&mut self, key: &str) -> Option<FeedPage> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.entries.remove(key);
                self.expired += 1;
                self.misses += 1;
                None
            }
            Some(entry) => {
                self.hits += 1;
                Some(entry.page.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    // == Set ==
    /// Stores `page` under `key` with the configured TTL, replacing any
    /// previous entry.
    pub fn set(&mut self, key: String, page: FeedPage) {
        let entry = CacheEntry {
            page,
            expires_at: now_ms() + self.ttl_ms,
        };
        self.entries.insert(key, entry);
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - self.entries.len();
        self.expired += removed as u64;
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> FeedCacheStats {
        FeedCacheStats {
            hits: self.hits,
            misses: self.misses,
            expired: self.expired,
            entries: self.entries.len(),
        }
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
