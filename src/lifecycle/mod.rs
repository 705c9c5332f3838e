//! Application startup and teardown: composes every external capability
//! into one handle built once and shared by reference across requests.

pub mod error;

pub use error::StartupError;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::cache::{ExactCacheHandle, RedisCache, SemanticCacheHandle};
use crate::config::Config;
use crate::constants::DEFAULT_EMBEDDING_DIM;
use crate::embedding::GeminiEmbedder;
use crate::pipeline::MemoryInterface;
use crate::reranker::{CrossEncoderReranker, RerankerConfig};
use crate::vectordb::PostgresVectorStore;

/// The composed runtime handle: DB pool, KV client, embedder, reranker, and
/// both in-process cache tiers, built once at startup and passed by
/// reference to every request handler.
pub struct AppContext {
    config: Config,
    memory: Arc<MemoryInterface>,
    pg_pool: Option<PgPool>,
}

impl AppContext {
    /// Builds every collaborator in the order §4.10 prescribes: Postgres
    /// pool, Redis client, embedder, reranker, then the L1/L3 tiers.
    pub async fn build(config: Config) -> Result<Self, StartupError> {
        info!("opening Postgres connection pool");
        let vector_store =
            PostgresVectorStore::connect(&config, DEFAULT_EMBEDDING_DIM).await?;
        let pg_pool = vector_store.pool().clone();

        info!(redis_url = %config.redis_url, "connecting to Redis");
        let kv_cache = RedisCache::connect(&config.redis_url).await?;

        info!("constructing Gemini embedder");
        let embedder = GeminiEmbedder::new(config.gemini_api_key.clone(), DEFAULT_EMBEDDING_DIM);

        info!("loading cross-encoder reranker");
        let reranker = CrossEncoderReranker::load(RerankerConfig::from_env()?)?;

        let l1 = ExactCacheHandle::new();
        let l3 = SemanticCacheHandle::new();

        let memory = MemoryInterface::new(
            Arc::new(embedder),
            Arc::new(vector_store),
            Arc::new(reranker),
            Arc::new(kv_cache),
            l1,
            l3,
        );

        Ok(Self {
            config,
            memory: Arc::new(memory),
            pg_pool: Some(pg_pool),
        })
    }

    /// Wraps an already-composed [`MemoryInterface`] for the gateway tests,
    /// bypassing every real network connection `build` would otherwise make.
    #[cfg(any(test, feature = "mock"))]
    pub fn for_tests(config: Config, memory: Arc<MemoryInterface>) -> Self {
        Self {
            config,
            memory,
            pg_pool: None,
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The composed retrieval pipeline.
    pub fn memory(&self) -> &Arc<MemoryInterface> {
        &self.memory
    }

    /// Tears down resources in the reverse of construction order. Each step
    /// is best-effort: a failure in one does not skip the rest.
    pub async fn shutdown(&self) {
        info!("clearing in-process L1/L3 caches");
        self.memory.clear_local_caches();

        info!("releasing reranker and embedder handles");
        // Neither holds an external connection; drop-based cleanup suffices.

        if let Some(pool) = &self.pg_pool {
            info!("closing Postgres connection pool");
            pool.close().await;
        }

        info!("shutdown complete");
    }
}
