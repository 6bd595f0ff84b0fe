//! Cache Store Module
//!
//! Main cache engine: a key map pointing into an arena-backed recency list,
//! guarded by a single mutex.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::cache::lru::{RecencyList, SlotId};
use crate::cache::snapshot::{self, SnapshotRecord};
use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

// == Inner State ==
/// Everything the lock protects. `index` and `order` always describe the
/// same set of keys.
#[derive(Debug)]
struct Inner<K, V> {
    index: HashMap<K, SlotId>,
    order: RecencyList<(K, V)>,
    stats: CacheStats,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash + Clone,
{
    fn entry_mut(&mut self, id: SlotId) -> &mut (K, V) {
        self.order
            .get_mut(id)
            .expect("key map points at a missing recency node")
    }

    fn evict_lru(&mut self) {
        let (key, _) = self
            .order
            .pop_back()
            .expect("eviction requested on an empty cache");
        let removed = self.index.remove(&key);
        assert!(removed.is_some(), "evicted node had no key map entry");
        self.stats.record_eviction();
    }

    fn check_consistent(&self) {
        debug_assert_eq!(
            self.index.len(),
            self.order.len(),
            "key map and recency list disagree on size"
        );
    }
}

// == Bounded Cache ==
/// Fixed-capacity key-value store with LRU eviction.
///
/// Every public operation takes the same lock for its whole duration, so
/// each call is atomic with respect to the others. Values are cloned out;
/// nothing outside the cache can reach its entries.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    capacity: usize,
    inner: Mutex<Inner<K, V>>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache holding at most `capacity` entries.
    ///
    /// # Errors
    /// `CacheError::InvalidConfiguration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidConfiguration(
                "capacity must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            capacity,
            inner: Mutex::new(Inner {
                index: HashMap::with_capacity(capacity),
                order: RecencyList::with_capacity(capacity),
                stats: CacheStats::new(),
            }),
        })
    }

    // == Get ==
    /// Returns a copy of the value for `key` and marks it most recently used.
    ///
    /// A missing key returns `None` and counts as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let Some(&id) = inner.index.get(key) else {
            inner.stats.record_miss();
            return None;
        };

        inner.order.move_to_front(id);
        inner.stats.record_hit();
        Some(inner.entry_mut(id).1.clone())
    }

    // == Put ==
    /// Inserts or replaces the value for `key` and marks it most recently used.
    ///
    /// Inserting a new key into a full cache evicts the least recently used
    /// entry.
    pub fn put(&self, key: K, value: V) {
        let mut inner = self.inner.lock();

        if let Some(&id) = inner.index.get(&key) {
            inner.entry_mut(id).1 = value;
            inner.order.move_to_front(id);
            return;
        }

        let id = inner.order.push_front((key.clone(), value));
        inner.index.insert(key, id);

        if inner.order.len() > self.capacity {
            inner.evict_lru();
            debug!("Evicted least recently used entry");
        }
        inner.check_consistent();
    }

    // == Length ==
    /// Returns the current number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().order.len()
    }

    /// Alias for [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Keys ==
    /// Returns all keys ordered from most to least recently used.
    pub fn keys_most_to_least_recent(&self) -> Vec<K> {
        let inner = self.inner.lock();
        inner.order.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Returns at most `n` keys, most recently used first.
    pub fn most_recent_keys(&self, n: usize) -> Vec<K> {
        let inner = self.inner.lock();
        inner.order.iter().take(n).map(|(key, _)| key.clone()).collect()
    }

    // == Clear ==
    /// Removes every entry. Capacity and statistics counters are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.index.clear();
        inner.order.clear();
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.total_entries = inner.order.len();
        stats.capacity = self.capacity;
        stats
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone + SnapshotRecord,
{
    // == Snapshot ==
    /// Writes all entries, most recently used first, to `destination`.
    ///
    /// The write goes through a temp file and an atomic rename while the
    /// cache lock is held. Returns the number of entry rows written.
    ///
    /// # Errors
    /// `CacheError::Io` if the temp file cannot be written or renamed. The
    /// cache itself is unaffected.
    pub fn snapshot(&self, destination: &Path, header: Option<&[&str]>) -> Result<usize> {
        let inner = self.inner.lock();
        let rows = snapshot::write_atomic(destination, |out| {
            snapshot::write_rows(out, header, inner.order.iter().map(|(_, v)| v.to_row()))
        })?;
        drop(inner);

        info!("Wrote {} cache entries to {}", rows, destination.display());
        Ok(rows)
    }
}
