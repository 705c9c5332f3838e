//! Pipeline error types and their HTTP-facing classification.

use thiserror::Error;

use crate::reranker::RerankerError;
use crate::vectordb::VectorDbError;

/// Errors the retrieval/write pipeline distinguishes.
///
/// Embedding failure is deliberately absent here — per the pipeline's
/// contract it degrades to an empty result, never an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Empty query, non-positive limit, or another boundary violation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The vector store call failed.
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(#[from] VectorDbError),

    /// The reranker faulted. Reranking is part of the contract when enabled;
    /// a failure here is never silently downgraded to un-reranked results.
    #[error("reranker failed: {0}")]
    RerankerFailure(#[from] RerankerError),

    /// The request's deadline elapsed before the pipeline could finish.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// The write path's embedder produced nothing to store.
    #[error("embedding unavailable, nothing to store")]
    EmbeddingUnavailable,
}
