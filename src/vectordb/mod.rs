//! Vector store abstraction: persists `(vector, text)` rows and answers
//! top-k cosine-similarity queries.

pub mod error;
pub mod postgres;
pub mod schema;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::VectorDbError;
pub use postgres::PostgresVectorStore;
pub use schema::{CREATE_EXTENSIONS_SQL, create_table_sql, drop_table_sql};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockVectorStore;

use async_trait::async_trait;

/// A persisted `(vector, text)` row. `id` is store-assigned and monotonic
/// within the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    /// Store-assigned row id.
    pub id: i64,
    /// The stored vector.
    pub vector: Vec<f32>,
    /// The stored text.
    pub text: String,
}

/// Persists `(vector, text)` rows and answers top-k cosine-similarity
/// queries. Must use cosine distance for ordering — Euclidean or
/// dot-product distance are non-conformant.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Persists a new `(vector, text)` row, returning it with its assigned
    /// id. Rejects a vector whose length doesn't match the store's
    /// configured dimension.
    async fn store(&self, vector: Vec<f32>, text: String) -> Result<StoredRow, VectorDbError>;

    /// Returns the texts of the `limit` rows of smallest cosine distance to
    /// `query_vector`, ordered nearest to furthest. Returned length is
    /// `min(limit, row_count)`.
    async fn find_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<String>, VectorDbError>;
}
