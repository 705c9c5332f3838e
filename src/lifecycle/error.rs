//! Startup failure classification for [`super::AppContext`].

use thiserror::Error;

use crate::cache::KvCacheError;
use crate::reranker::RerankerError;
use crate::vectordb::VectorDbError;

/// Errors that can abort startup. Each variant names the resource whose
/// construction failed; teardown of anything already built is the caller's
/// responsibility (handled by [`super::AppContext::shutdown`] once a context
/// exists, not during a failed `build`).
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to open database pool: {0}")]
    Database(#[from] VectorDbError),

    #[error("failed to connect to Redis: {0}")]
    Redis(#[from] KvCacheError),

    #[error("failed to load reranker: {0}")]
    Reranker(#[from] RerankerError),
}
