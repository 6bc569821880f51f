//! # Shared TTL Cache
//!
//! A small in-process cache with per-entry TTL or forever semantics.
//!
//! ## Thread Safety
//! The map is wrapped in `Arc<Mutex<T>>`:
//! 1. Services are cloned into every request handler
//! 2. Lookups and inserts are quick; a Mutex is enough
//! 3. Expired entries are dropped lazily on read
//!
//! ## Where It Is Used
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cache                 Key                         TTL                  │
//! │  ────────────────────  ──────────────────────────  ──────────────────   │
//! │  FX rates              "USD:EUR:2026-03-01"        1 hour               │
//! │  FX rates (no date)    "USD:EUR:latest"            1 hour               │
//! │  Currency exponents    CurrencyCode                forever              │
//! │  Conversion graphs     company_id                  5 minutes            │
//! │                                                                         │
//! │  Writers invalidate their keys explicitly (upsert paths).               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// One cached value with an optional expiry.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }
}

/// Shared in-process cache with TTL and forever semantics.
///
/// Cloning is cheap and shares the underlying store.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    inner: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        TtlCache {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached value if present and not expired.
    ///
    /// Expired entries are removed on the way out.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        let now = Instant::now();

        if let Some(entry) = map.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }

        // Either absent or expired; dropping an absent key is a no-op
        map.remove(key);
        None
    }

    /// Inserts a value that expires after `ttl`.
    pub fn insert(&self, key: K, value: V, ttl: Duration) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(
            key,
            CacheEntry {
                value,
                expires_at: Some(Instant::now() + ttl),
            },
        );
    }

    /// Inserts a value with no expiry (reference data).
    pub fn insert_forever(&self, key: K, value: V) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.insert(
            key,
            CacheEntry {
                value,
                expires_at: None,
            },
        );
    }

    /// Removes a key (write-path invalidation).
    pub fn remove(&self, key: &K) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut map = self.inner.lock().expect("cache mutex poisoned");
        map.clear();
    }

    /// Number of entries currently stored (expired included until read).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache mutex poisoned").len()
    }

    /// True when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let cache: TtlCache<String, i64> = TtlCache::new();
        cache.insert("a".to_string(), 1, Duration::from_secs(60));

        assert_eq!(cache.get(&"a".to_string()), Some(1));
        assert_eq!(cache.get(&"b".to_string()), None);
    }

    #[test]
    fn test_expiry() {
        let cache: TtlCache<String, i64> = TtlCache::new();
        cache.insert("a".to_string(), 1, Duration::from_millis(10));

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"a".to_string()), None);
        // Expired entry was dropped on read
        assert!(cache.is_empty());
    }

    #[test]
    fn test_forever_entries_do_not_expire() {
        let cache: TtlCache<String, i64> = TtlCache::new();
        cache.insert_forever("a".to_string(), 1);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(&"a".to_string()), Some(1));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache: TtlCache<String, i64> = TtlCache::new();
        cache.insert_forever("a".to_string(), 1);
        cache.insert_forever("b".to_string(), 2);

        cache.remove(&"a".to_string());
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.get(&"b".to_string()), Some(2));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_the_store() {
        let cache: TtlCache<String, i64> = TtlCache::new();
        let clone = cache.clone();

        cache.insert_forever("a".to_string(), 1);
        assert_eq!(clone.get(&"a".to_string()), Some(1));
    }
}
