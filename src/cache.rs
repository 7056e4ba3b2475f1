//! A bounded, time-expiring, in-memory cache shared by all API operations.
//!
//! Keys are raw API URLs (branch and tree lookups) or composite
//! `owner/repo/branch/path` keys (decoded file content). Entries expire after
//! a fixed TTL and are shadowed rather than purged. When a new key would
//! exceed the size bound, the entry stored longest ago is evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    // Breaks ties between entries stored at the same instant.
    seq: u64,
}

#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_seq: u64,
    epoch: u64,
}

/// Process-lifetime API cache.
///
/// All state sits behind a single mutex; no lock is ever held across an
/// `.await`.
///
/// # Examples
///
/// ```
/// use repo_explorer::cache::ApiCache;
/// use std::time::Duration;
///
/// let cache = ApiCache::new(Duration::from_secs(60), 2);
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.put("c", 3); // evicts "a", the oldest entry
///
/// assert_eq!(cache.get("a"), None);
/// assert_eq!(cache.get("c"), Some(3));
/// ```
#[derive(Debug)]
pub struct ApiCache<V> {
    state: Mutex<CacheState<V>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> ApiCache<V> {
    /// Creates an empty cache.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                next_seq: 0,
                epoch: 0,
            }),
            ttl,
            max_entries,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        // Cache state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value for `key` if present and younger than the TTL.
    pub fn get(&self, key: &str) -> Option<V> {
        let state = self.lock();
        let entry = state.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            log::debug!("Cache entry expired: {}", key);
            None
        }
    }

    /// Inserts or overwrites `key`, stamping it with the current time.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let mut state = self.lock();
        self.insert_locked(&mut state, key.into(), value);
    }

    /// Inserts `key` only if the cache has not been cleared since `epoch` was
    /// read. Returns whether the value was stored.
    pub fn put_if_epoch(&self, epoch: u64, key: impl Into<String>, value: V) -> bool {
        let mut state = self.lock();
        if state.epoch != epoch {
            log::debug!("Discarding result issued before cache clear.");
            return false;
        }
        self.insert_locked(&mut state, key.into(), value);
        true
    }

    fn insert_locked(&self, state: &mut CacheState<V>, key: String, value: V) {
        if self.max_entries == 0 {
            return;
        }
        if !state.entries.contains_key(&key) && state.entries.len() >= self.max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.stored_at, e.seq))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                log::debug!("Cache full, evicting oldest entry: {}", oldest);
                state.entries.remove(&oldest);
            }
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        state.entries.insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
                seq,
            },
        );
    }

    /// Removes every entry and starts a new epoch.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.epoch += 1;
    }

    /// The current epoch, bumped by every [`clear`](Self::clear).
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Number of stored entries, including expired ones not yet overwritten.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns `true` if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test(start_paused = true)]
    async fn test_get_after_put_until_ttl() {
        let cache = ApiCache::new(TTL, 10);
        cache.put("k", "v".to_string());
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get("k").as_deref(), Some("v"));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get("k"), None);
        // Expired entries are shadowed, not purged.
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restamps_entry() {
        let cache = ApiCache::new(TTL, 10);
        cache.put("k", 1);
        tokio::time::advance(TTL - Duration::from_secs(1)).await;
        cache.put("k", 2);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_removes_exactly_the_oldest() {
        let cache = ApiCache::new(TTL, 3);
        cache.put("first", 1);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put("second", 2);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put("third", 3);
        tokio::time::advance(Duration::from_secs(1)).await;

        // Re-stamping "first" makes "second" the oldest.
        cache.put("first", 10);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put("fourth", 4);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get("second"), None);
        assert_eq!(cache.get("first"), Some(10));
        assert_eq!(cache.get("third"), Some(3));
        assert_eq!(cache.get("fourth"), Some(4));
    }

    #[test]
    fn test_eviction_ties_use_insertion_order() {
        // Without a paused clock, entries may share an instant; sequence decides.
        let cache = ApiCache::new(TTL, 2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("c", 3);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_overwrite_at_capacity_does_not_evict() {
        let cache = ApiCache::new(TTL, 2);
        cache.put("a", 1);
        cache.put("b", 2);
        cache.put("b", 3);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), Some(3));
    }

    #[test]
    fn test_clear_bumps_epoch_and_rejects_stale_writes() {
        let cache = ApiCache::new(TTL, 10);
        let epoch = cache.epoch();
        cache.put("k", 1);
        cache.clear();

        assert!(cache.is_empty());
        assert!(!cache.put_if_epoch(epoch, "k", 2));
        assert_eq!(cache.get("k"), None);

        assert!(cache.put_if_epoch(cache.epoch(), "k", 3));
        assert_eq!(cache.get("k"), Some(3));
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let cache = ApiCache::new(TTL, 0);
        cache.put("k", 1);
        assert_eq!(cache.get("k"), None);
    }
}
