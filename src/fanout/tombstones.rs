//! Tombstone Module
//!
//! Short-lived record of deleted content ids. A creation event arriving after
//! its deletion (out-of-order delivery across the two topics) is dropped
//! instead of resurrecting the content. Entries expire after a fixed TTL and
//! are swept by the background cleanup task.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::clock::now_ms;

/// How long a deletion shadows later creation events
pub const TOMBSTONE_TTL_MS: i64 = 60_000;

// == Tombstones ==
#[derive(Debug)]
pub struct Tombstones {
    /// id -> expiry timestamp (Unix milliseconds)
    inner: Mutex<HashMap<u64, i64>>,
    ttl_ms: i64,
}

impl Default for Tombstones {
    fn default() -> Self {
        Self::new(TOMBSTONE_TTL_MS)
    }
}

impl Tombstones {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl_ms,
        }
    }

    /// Records a deletion. A lost lock (poisoned mutex) degrades to not
    /// recording; the ordering gap this guards is already best-effort.
    pub fn record(&self, id: u64) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(id, now_ms() + self.ttl_ms);
        }
    }

    /// Whether `id` was deleted within the TTL.
    pub fn contains(&self, id: u64) -> bool {
        match self.inner.lock() {
            Ok(map) => map.get(&id).is_some_and(|&expires| expires > now_ms()),
            Err(_) => false,
        }
    }

    /// Drops expired tombstones, returning how many were removed.
    pub fn sweep(&self) -> usize {
        let Ok(mut map) = self.inner.lock() else {
            return 0;
        };
        let now = now_ms();
        let before = map.len();
        map.retain(|_, &mut expires| expires > now);
        before - map.len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
