//! Memoization of fetched collections.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

/// An immutable, shareable list of items as fetched from the data source.
pub type Collection<T> = Arc<Vec<T>>;

/// Cache key for the top-level catalog, which has no parent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKey {
    All,
}

/// Unbounded, write-once cache of collections keyed by parent id.
///
/// Entries are never replaced or evicted, so memory grows with the number of
/// distinct keys visited. Absence is a normal state, not an error.
///
/// The cache also remembers which keys have a fetch outstanding so that a
/// second request for the same key waits for the first instead of issuing
/// another fetch.
#[derive(Debug)]
pub struct CollectionCache<K, T> {
    entries: HashMap<K, Collection<T>>,
    in_flight: HashSet<K>,
}

impl<K, T> Default for CollectionCache<K, T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            in_flight: HashSet::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, T> CollectionCache<K, T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached collection for `key`.
    pub fn get(&self, key: &K) -> Option<Collection<T>> {
        self.entries.get(key).cloned()
    }

    /// Store a collection for `key` and return the cached value.
    ///
    /// The first write wins: if `key` is already populated the existing
    /// collection is returned and `items` is dropped.
    pub fn put(&mut self, key: K, items: Vec<T>) -> Collection<T> {
        self.entries
            .entry(key)
            .or_insert_with(|| Arc::new(items))
            .clone()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark a fetch for `key` as started.
    ///
    /// Returns `false` when the key is already cached or a fetch for it is
    /// outstanding, in which case the caller must not fetch again.
    pub fn begin_fetch(&mut self, key: K) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        self.in_flight.insert(key)
    }

    /// Clear the outstanding-fetch marker for `key`.
    pub fn finish_fetch(&mut self, key: &K) {
        self.in_flight.remove(key);
    }

    pub fn is_fetching(&self, key: &K) -> bool {
        self.in_flight.contains(key)
    }

    /// Whether any fetch is outstanding.
    pub fn any_fetching(&self) -> bool {
        !self.in_flight.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_miss_is_none() {
        let cache: CollectionCache<u64, String> = CollectionCache::new();
        assert!(cache.get(&1).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_put_then_get_same_arc() {
        let mut cache = CollectionCache::new();
        let stored = cache.put(1u64, vec!["a".to_string()]);
        let fetched = cache.get(&1).unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_write_wins() {
        let mut cache = CollectionCache::new();
        cache.put(CatalogKey::All, vec![1, 2, 3]);
        let second = cache.put(CatalogKey::All, vec![9]);
        assert_eq!(*second, vec![1, 2, 3]);
        assert_eq!(*cache.get(&CatalogKey::All).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_begin_fetch_once_per_key() {
        let mut cache: CollectionCache<u64, u8> = CollectionCache::new();
        assert!(cache.begin_fetch(5));
        assert!(!cache.begin_fetch(5));
        assert!(cache.is_fetching(&5));
        assert!(cache.begin_fetch(6));

        cache.finish_fetch(&5);
        assert!(!cache.is_fetching(&5));
        assert!(cache.begin_fetch(5));
    }

    #[test]
    fn test_begin_fetch_refused_when_cached() {
        let mut cache = CollectionCache::new();
        cache.put(3u64, vec![0u8]);
        assert!(!cache.begin_fetch(3));
    }
}
