//! Tunable limits shared across cache tiers and the pipeline.

/// Maximum number of entries held in the L1 exact-match cache.
pub const EXACT_MAX: usize = 50;

/// Maximum number of entries held in the L3 semantic cache.
pub const SEMANTIC_MAX: usize = 10;

/// Minimum cosine similarity for an L3 lookup to count as a hit.
pub const COS_THRESHOLD: f32 = 0.90;

/// Default `limit` applied when a retrieval request omits one.
pub const DEFAULT_LIMIT: usize = 5;

/// Embedding dimensionality used by the reference deployment (Gemini `gemini-embedding-001`).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;
