//! In-memory [`VectorStore`] used by tests and the `mock` feature.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{StoredRow, VectorDbError, VectorStore};
use crate::cache::cosine_similarity;

/// In-memory vector store that ranks by cosine distance via linear scan,
/// matching the real store's ordering contract without a live Postgres.
#[derive(Clone, Default)]
pub struct MockVectorStore {
    rows: Arc<Mutex<Vec<StoredRow>>>,
    next_id: Arc<AtomicI64>,
    find_similar_calls: Arc<AtomicUsize>,
    dimension: Option<usize>,
}

impl MockVectorStore {
    /// Creates an empty store with no dimension check.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(1)),
            find_similar_calls: Arc::new(AtomicUsize::new(0)),
            dimension: None,
        }
    }

    /// Creates an empty store that rejects vectors of the wrong dimension.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            ..Self::new()
        }
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    /// Number of times `find_similar` has been invoked.
    pub fn find_similar_call_count(&self) -> usize {
        self.find_similar_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn store(&self, vector: Vec<f32>, text: String) -> Result<StoredRow, VectorDbError> {
        if let Some(expected) = self.dimension
            && vector.len() != expected
        {
            return Err(VectorDbError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = StoredRow { id, vector, text };
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn find_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<String>, VectorDbError> {
        self.find_similar_calls.fetch_add(1, Ordering::SeqCst);

        let rows = self.rows.lock();
        let mut scored: Vec<(&StoredRow, f32)> = rows
            .iter()
            .map(|row| (row, cosine_similarity(&row.vector, query_vector)))
            .collect();
        // Descending similarity == ascending cosine distance. Ties keep
        // insertion order (a stable sort preserves it).
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(row, _)| row.text.clone())
            .collect())
    }
}
