//! Result stores keyed by unit identifier.
//!
//! Batch stages consult a [`ResultStore`] before computing a unit and write
//! the outcome after it completes, so re-running a stage over the same store
//! only computes units that are still absent.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

/// Idempotent key-value store for unit outcomes.
///
/// `put` keeps the first value written for a key; later writes are ignored.
pub trait ResultStore<V: Clone>: Send + Sync {
    /// Returns the stored value for `key`.
    fn get(&self, key: &str) -> Option<V>;

    /// Stores `value` under `key` unless a value is already present, and
    /// returns the value that ends up stored.
    fn put(&self, key: &str, value: V) -> V;

    /// Returns the stored value for `key`, computing and storing it first
    /// when absent.
    fn compute_if_absent<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
        Self: Sized,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        self.put(key, compute())
    }
}

/// Concurrent in-memory [`ResultStore`] backed by a [`DashMap`].
///
/// # Examples
/// ```
/// use streetprint_core::{InMemoryStore, ResultStore};
///
/// let store = InMemoryStore::new();
/// assert_eq!(store.compute_if_absent("a", || 1), 1);
/// assert_eq!(store.compute_if_absent("a", || 2), 1);
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug)]
pub struct InMemoryStore<V> {
    entries: DashMap<Arc<str>, V>,
}

impl<V> Default for InMemoryStore<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> InMemoryStore<V> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when `key` has a stored value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    #[cfg(feature = "metrics")]
    fn record_hit(&self) {
        metrics::counter!("result_store_hits").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    const fn record_hit(&self) {}

    #[cfg(feature = "metrics")]
    fn record_miss(&self) {
        metrics::counter!("result_store_misses").increment(1);
    }

    #[cfg(not(feature = "metrics"))]
    const fn record_miss(&self) {}
}

impl<V: Clone + Send + Sync> ResultStore<V> for InMemoryStore<V> {
    fn get(&self, key: &str) -> Option<V> {
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        if found.is_some() {
            self.record_hit();
        } else {
            self.record_miss();
        }
        trace!(key, hit = found.is_some(), "result store lookup");
        found
    }

    fn put(&self, key: &str, value: V) -> V {
        self.entries
            .entry(Arc::from(key))
            .or_insert(value)
            .value()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rayon::prelude::*;

    use super::*;

    #[test]
    fn first_write_wins() {
        let store = InMemoryStore::new();
        assert_eq!(store.put("k", 1), 1);
        assert_eq!(store.put("k", 2), 1);
        assert_eq!(store.get("k"), Some(1));
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn compute_if_absent_skips_known_keys() {
        let store = InMemoryStore::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            store.compute_if_absent("unit", || calls.fetch_add(1, Ordering::Relaxed) + 10);
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
        assert_eq!(store.get("unit"), Some(10));
    }

    #[test]
    fn concurrent_inserts_keep_one_value_per_key() {
        let store = InMemoryStore::new();
        (0..64_usize).into_par_iter().for_each(|i| {
            store.put(&format!("k{}", i % 8), i);
        });
        assert_eq!(store.len(), 8);
        for key in 0..8 {
            let value = store.get(&format!("k{key}")).unwrap_or(usize::MAX);
            assert_eq!(value % 8, key);
        }
        store.clear();
        assert!(store.is_empty());
    }
}
