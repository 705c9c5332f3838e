//! Deterministic reranker used by tests and the `mock` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Reranker, RerankerError};

/// Reranker stub that sorts candidates by descending string length (ties
/// broken by original order), recording every call it receives.
#[derive(Clone, Default)]
pub struct MockReranker {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    call_count: Arc<AtomicUsize>,
    should_fail: Arc<AtomicBool>,
}

impl MockReranker {
    /// Creates a fresh mock reranker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `rerank` call return [`RerankerError`].
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of times `rerank` has been invoked.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every `(query, docs)` pair this reranker has been asked to reorder.
    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Reranker for MockReranker {
    async fn rerank(&self, query: &str, docs: Vec<String>) -> Result<Vec<String>, RerankerError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push((query.to_string(), docs.clone()));

        if self.should_fail.load(Ordering::SeqCst) {
            return Err(RerankerError::InferenceFailed {
                reason: "mock reranker configured to fail".to_string(),
            });
        }

        let mut indexed: Vec<(usize, String)> = docs.into_iter().enumerate().collect();
        indexed.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(&b.0)));

        Ok(indexed.into_iter().map(|(_, doc)| doc).collect())
    }
}

/// A reranker that must never be called; used to assert a cache hit path
/// skips reranking entirely.
#[derive(Clone, Default)]
pub struct PanicReranker;

#[async_trait]
impl Reranker for PanicReranker {
    async fn rerank(&self, _query: &str, _docs: Vec<String>) -> Result<Vec<String>, RerankerError> {
        panic!("reranker should not have been called");
    }
}
