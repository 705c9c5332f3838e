//! Deterministic embedder used by tests and the `mock` feature.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{Embedder, TaskType};

/// Embedder that returns vectors from a fixed lookup table (or a deterministic
/// hash-derived vector when a text has no table entry), recording every call
/// so tests can assert it was or wasn't invoked.
#[derive(Clone)]
pub struct MockEmbedder {
    dimension: usize,
    table: Arc<Mutex<std::collections::HashMap<String, Vec<f32>>>>,
    calls: Arc<Mutex<Vec<(String, TaskType)>>>,
    fail_next: Arc<AtomicBool>,
}

impl MockEmbedder {
    /// Creates a mock embedder producing vectors of `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            table: Arc::new(Mutex::new(std::collections::HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Registers the vector to return for an exact text match.
    pub fn register(&self, text: &str, vector: Vec<f32>) {
        self.table.lock().insert(text.to_string(), vector);
    }

    /// Makes the next `embed` call return empty, simulating a provider fault.
    pub fn fail_next_call(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Every `(text, task_type)` pair this embedder has been asked to embed.
    pub fn calls(&self) -> Vec<(String, TaskType)> {
        self.calls.lock().clone()
    }

    /// Number of times `embed` has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn derive_vector(&self, text: &str) -> Vec<f32> {
        let mut seed: u64 = 1469598103934665603;
        for byte in text.bytes() {
            seed ^= byte as u64;
            seed = seed.wrapping_mul(1099511628211);
        }
        let mut vector = Vec::with_capacity(self.dimension);
        let mut state = seed;
        for _ in 0..self.dimension {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 33) as i64 % 1000) as f32 / 1000.0;
            vector.push(value);
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String], task_type: TaskType) -> Vec<Vec<f32>> {
        for text in texts {
            self.calls.lock().push((text.clone(), task_type));
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Vec::new();
        }

        texts
            .iter()
            .map(|text| {
                self.table
                    .lock()
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.derive_vector(text))
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
