//! L3 semantic cache: a bounded FIFO of `(vector, result)` pairs probed by
//! cosine similarity rather than exact key.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::key::cosine_similarity;
use crate::constants::{COS_THRESHOLD, SEMANTIC_MAX};

struct SemanticEntry {
    vector: Vec<f32>,
    result: Vec<String>,
}

/// Bounded FIFO queue of `(vector, result)` pairs probed by cosine similarity.
///
/// `lookup` performs a linear scan in insertion order and returns the first
/// entry whose similarity to the query vector is at or above
/// [`COS_THRESHOLD`]. `append` pushes at the tail and, once full, drops the
/// head (oldest) entry.
pub struct SemanticCache {
    capacity: usize,
    entries: Mutex<VecDeque<SemanticEntry>>,
}

impl SemanticCache {
    /// Creates a semantic cache bounded at [`SEMANTIC_MAX`] entries.
    pub fn new() -> Self {
        Self::with_capacity(SEMANTIC_MAX)
    }

    /// Creates a semantic cache bounded at `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Returns the result of the first insertion-order entry whose cosine
    /// similarity to `vector` is `>= COS_THRESHOLD`, or `None` if no entry
    /// qualifies.
    pub fn lookup(&self, vector: &[f32]) -> Option<Vec<String>> {
        let entries = self.entries.lock();
        entries
            .iter()
            .find(|entry| cosine_similarity(&entry.vector, vector) >= COS_THRESHOLD)
            .map(|entry| entry.result.clone())
    }

    /// Appends `(vector, result)` at the tail, evicting the head entry if the
    /// cache is already at capacity.
    pub fn append(&self, vector: Vec<f32>, result: Vec<String>) {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(SemanticEntry { vector, result });
    }

    /// Current number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for SemanticCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`SemanticCache`], cheaply cloneable across request
/// handlers.
#[derive(Clone)]
pub struct SemanticCacheHandle(Arc<SemanticCache>);

impl SemanticCacheHandle {
    /// Wraps a new [`SemanticCache`] for sharing.
    pub fn new() -> Self {
        Self(Arc::new(SemanticCache::new()))
    }
}

impl Default for SemanticCacheHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Deref for SemanticCacheHandle {
    type Target = SemanticCache;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn lookup_misses_on_empty_cache() {
        let cache = SemanticCache::new();
        assert_eq!(cache.lookup(&[1.0, 0.0]), None);
    }

    #[test]
    fn lookup_hits_above_threshold() {
        let cache = SemanticCache::new();
        cache.append(vec![1.0, 0.0, 0.0], docs(&["x", "y", "z"]));
        // cos(v1, v2) ~ 0.995 with v2 = [1.0, 0.1, 0.0]
        let hit = cache.lookup(&[1.0, 0.1, 0.0]);
        assert_eq!(hit, Some(docs(&["x", "y", "z"])));
    }

    #[test]
    fn lookup_misses_below_threshold() {
        let cache = SemanticCache::new();
        cache.append(vec![1.0, 0.0], docs(&["x"]));
        assert_eq!(cache.lookup(&[0.0, 1.0]), None);
    }

    #[test]
    fn lookup_returns_first_insertion_order_match() {
        let cache = SemanticCache::new();
        cache.append(vec![1.0, 0.0], docs(&["first"]));
        cache.append(vec![1.0, 0.01], docs(&["second"]));
        let hit = cache.lookup(&[1.0, 0.0]);
        assert_eq!(hit, Some(docs(&["first"])));
    }

    #[test]
    fn eleventh_append_drops_exactly_the_head() {
        let cache = SemanticCache::new();
        for i in 0..10 {
            cache.append(vec![i as f32, 1.0], docs(&["r"]));
        }
        assert_eq!(cache.len(), 10);
        // head is vector [0.0, 1.0]; an exact match should hit before the append.
        assert!(cache.lookup(&[0.0, 1.0]).is_some());

        cache.append(vec![10.0, 1.0], docs(&["r"]));
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.lookup(&[0.0, 1.0]), None);
        assert!(cache.lookup(&[10.0, 1.0]).is_some());
    }
}
