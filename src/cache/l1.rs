//! L1 exact-match cache: a bounded, recency-ordered mapping from
//! [`cache_key`](super::key::cache_key) to a result list.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::constants::EXACT_MAX;

/// Bounded in-process LRU cache from `CacheKey` to a result list.
///
/// Insertion past `EXACT_MAX` entries evicts the least-recently-used entry.
/// All operations take the lock only for the duration of the map access, not
/// across any downstream I/O.
pub struct ExactCache {
    inner: Mutex<LruCache<String, Vec<String>>>,
}

impl ExactCache {
    /// Creates an exact cache bounded at [`EXACT_MAX`] entries.
    pub fn new() -> Self {
        Self::with_capacity(EXACT_MAX)
    }

    /// Creates an exact cache bounded at `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Looks up `key`, refreshing its recency on a hit.
    pub fn get(&self, key: &str) -> Option<Vec<String>> {
        self.inner.lock().get(key).cloned()
    }

    /// Inserts or overwrites `key`, moving it to the most-recently-used
    /// position. Evicts the least-recently-used entry if this insertion
    /// pushes the cache past capacity.
    pub fn set(&self, key: String, value: Vec<String>) {
        self.inner.lock().put(key, value);
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for ExactCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to an [`ExactCache`], cheaply cloneable across request
/// handlers.
#[derive(Clone)]
pub struct ExactCacheHandle(Arc<ExactCache>);

impl ExactCacheHandle {
    /// Wraps a new [`ExactCache`] for sharing.
    pub fn new() -> Self {
        Self(Arc::new(ExactCache::new()))
    }
}

impl Default for ExactCacheHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for ExactCacheHandle {
    type Target = ExactCache;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
