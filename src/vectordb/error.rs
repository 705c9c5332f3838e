//! Vector store error types.

use thiserror::Error;

/// Errors returned by [`super::VectorStore`] operations.
#[derive(Debug, Error)]
pub enum VectorDbError {
    /// Could not connect to or query the store.
    #[error("vector store unavailable: {0}")]
    Unavailable(String),

    /// A write's vector dimension did not match the store's configured
    /// dimension. Fatal at write time — never silently truncated or padded.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Store-configured dimension.
        expected: usize,
        /// Dimension of the rejected vector.
        actual: usize,
    },
}
