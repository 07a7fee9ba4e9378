//! # Expiring Key Set
//!
//! Bounded, time-expiring set used for duplicate-message suppression
//! (fresh block ids, sync request ids). Capacity is enforced by LRU
//! eviction; entries older than the TTL count as absent.

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Concurrent set of recently seen keys.
pub struct ExpiringKeySet<K: Hash + Eq> {
    entries: Mutex<LruCache<K, Instant>>,
    ttl: Duration,
}

impl<K: Hash + Eq> ExpiringKeySet<K> {
    /// Create a set holding at most `capacity` keys for `ttl` each.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    /// Record `key`; returns `false` if it was already present and fresh.
    ///
    /// Check and insert happen under one lock, so two concurrent callers
    /// with the same key never both see `true`.
    pub fn insert_if_absent(&self, key: K) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        // `peek` keeps LRU order equal to insertion order for `purge_expired`.
        if let Some(seen) = entries.peek(&key) {
            if now.duration_since(*seen) < self.ttl {
                return false;
            }
        }
        entries.put(key, now);
        true
    }

    /// Whether `key` is present and fresh.
    pub fn contains(&self, key: &K) -> bool {
        let entries = self.entries.lock();
        entries
            .peek(key)
            .is_some_and(|seen| seen.elapsed() < self.ttl)
    }

    /// Drop expired entries; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        while let Some((_, seen)) = entries.peek_lru() {
            if seen.elapsed() < self.ttl {
                break;
            }
            entries.pop_lru();
        }
        before - entries.len()
    }

    /// Number of stored keys (fresh or not yet purged).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_second_insert_is_duplicate() {
        let set = ExpiringKeySet::new(10, Duration::from_secs(60));
        assert!(set.insert_if_absent("a"));
        assert!(!set.insert_if_absent("a"));
        assert!(set.contains(&"a"));
        assert!(!set.contains(&"b"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let set = ExpiringKeySet::new(2, Duration::from_secs(60));
        set.insert_if_absent(1);
        set.insert_if_absent(2);
        set.insert_if_absent(3);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&1));
        assert!(set.insert_if_absent(1));
    }

    #[test]
    fn test_expired_entries() {
        let set = ExpiringKeySet::new(10, Duration::from_millis(20));
        set.insert_if_absent("a");
        std::thread::sleep(Duration::from_millis(40));
        assert!(!set.contains(&"a"));
        assert_eq!(set.purge_expired(), 1);
        assert!(set.is_empty());
        assert!(set.insert_if_absent("a"));
    }

    #[test]
    fn test_concurrent_get_or_insert_admits_once() {
        let set = Arc::new(ExpiringKeySet::new(100, Duration::from_secs(60)));
        let admitted: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let set = Arc::clone(&set);
                    s.spawn(move || set.insert_if_absent("block") as usize)
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(admitted, 1);
    }
}
