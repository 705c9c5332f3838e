//! # Semantic Retrieval Middleware
//!
//! Latency-aware semantic retrieval: a natural-language query goes in, the
//! top-k most similar stored documents come out, by way of a tiered cache
//! that minimizes embedding-API calls and vector-database round-trips.
//!
//! ```text
//! Request → L1 (exact) → L2 (durable) → embed → L3 (semantic) → vector store → rerank
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use retrieval_middleware::config::Config;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("binding to {}", config.bind_addr);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Purpose |
//! |---------|---------|
//! | `cpu` | CPU-only reranker inference (docs.rs default) |
//! | `metal` | Apple Silicon GPU acceleration for the reranker |
//! | `cuda` | NVIDIA GPU acceleration for the reranker |
//! | `mock` | In-memory stand-ins for every external collaborator |
//!
//! ## Modules
//!
//! - [`pipeline`] — the tiered retrieval cascade (`MemoryInterface::retrieve`)
//! - [`cache`] — L1 exact cache, L2 durable cache, L3 semantic cache
//! - [`embedding`] — the `Embedder` capability and its Gemini implementation
//! - [`reranker`] — the `Reranker` capability and its cross-encoder implementation
//! - [`vectordb`] — the `VectorStore` capability and its Postgres/pgvector implementation
//! - [`config`] — environment-backed configuration
//! - [`lifecycle`] — startup composition and graceful teardown
//! - [`gateway`] — the HTTP admin/test surface

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod lifecycle;
pub mod pipeline;
pub mod reranker;
pub mod vectordb;

pub use cache::{ExactCache, ExactCacheHandle, KVCache, KvCacheError, RedisCache};
pub use cache::{SemanticCache, SemanticCacheHandle, cache_key, cosine_similarity};
pub use config::{Config, ConfigError};
pub use embedding::{Embedder, EmbeddingError, GeminiEmbedder, TaskType};
pub use lifecycle::{AppContext, StartupError};
pub use pipeline::{MemoryInterface, PipelineError, RequestContext};
pub use reranker::{CrossEncoderReranker, DevicePreference, Reranker, RerankerConfig, RerankerError};
pub use vectordb::{PostgresVectorStore, StoredRow, VectorDbError, VectorStore};
