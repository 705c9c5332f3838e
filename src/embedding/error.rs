//! Embedding provider error types.

use thiserror::Error;

/// Errors surfaced internally by an [`super::Embedder`] implementation.
///
/// These never cross the [`super::Embedder::embed`] boundary: per the
/// pipeline's contract, an embedding failure degrades to an empty vector
/// batch rather than propagating as an error. The variants exist so
/// implementations have something concrete to log before swallowing.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The provider request failed at the transport layer.
    #[error("embedding provider request failed: {0}")]
    RequestFailed(String),

    /// The provider responded with a non-success status.
    #[error("embedding provider returned status {status}: {body}")]
    ProviderStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated for logging.
        body: String,
    },

    /// The response body could not be parsed into the expected shape.
    #[error("embedding provider response malformed: {0}")]
    MalformedResponse(String),
}
