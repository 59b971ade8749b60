//! TTL-aware response cache.
//!
//! Entries record when they were captured, not when they expire. Freshness is
//! decided at read time against the TTL of the action doing the read, so a
//! stale entry is simply ignored and stays in the store until the next
//! successful fetch overwrites it. Nothing sweeps the store in the
//! background; memory is bounded only by the number of distinct keys ever
//! written. Callers that need a bound call [`CacheStore::evict_stale`].

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tokio::time::Instant;

// ─── CacheEntry ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: Value,
    /// Capture time.
    pub timestamp: Instant,
}

impl CacheEntry {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            timestamp: Instant::now(),
        }
    }

    /// `true` while `now - timestamp < ttl`.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.timestamp.elapsed() < ttl
    }
}

// ─── CacheStore ───────────────────────────────────────────────────────────

/// Keyed store of previously fetched payloads.
///
/// Implementations must not hold locks across `.await` points; every method
/// here is synchronous.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Store `data` under `key`, stamped with the current time. Any prior
    /// entry is overwritten.
    fn set(&self, key: &str, data: Value);

    fn delete(&self, key: &str);

    fn clear(&self);

    /// Remove every entry captured `ttl` or more ago. Returns how many were
    /// dropped.
    fn evict_stale(&self, ttl: Duration) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── MemoryCache ──────────────────────────────────────────────────────────

/// Process-local [`CacheStore`] backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, data: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), CacheEntry::new(data));
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.clear();
    }

    fn evict_stale(&self, ttl: Duration) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(ttl));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
