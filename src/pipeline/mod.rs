//! The tiered retrieval pipeline: the L1 / L2 / L3 / vector-DB / rerank
//! cascade behind a single [`MemoryInterface::retrieve`] call, plus the
//! write-path [`MemoryInterface::store`].

pub mod context;
pub mod error;

#[cfg(test)]
mod tests;

pub use context::RequestContext;
pub use error::PipelineError;

use std::sync::Arc;
use std::time::Instant as StdInstant;

use tokio::time::timeout;
use tracing::{info, warn};

use crate::cache::{ExactCacheHandle, KVCache, KvCacheError, SemanticCacheHandle, cache_key};
use crate::embedding::{Embedder, TaskType};
use crate::reranker::Reranker;
use crate::vectordb::{StoredRow, VectorStore};

/// Orchestrates the embedder, vector store, reranker, and all three cache
/// tiers behind `retrieve`/`store`. Built once at startup and shared by
/// reference across every request.
pub struct MemoryInterface {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    reranker: Arc<dyn Reranker>,
    kv_cache: Arc<dyn KVCache>,
    l1: ExactCacheHandle,
    l3: SemanticCacheHandle,
}

impl MemoryInterface {
    /// Composes the pipeline from its collaborators.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        reranker: Arc<dyn Reranker>,
        kv_cache: Arc<dyn KVCache>,
        l1: ExactCacheHandle,
        l3: SemanticCacheHandle,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            reranker,
            kv_cache,
            l1,
            l3,
        }
    }

    /// Runs the full L1 → L2 → embed → L3 → vector-store cascade described
    /// in §4.7, returning the top-`limit` documents for `query`.
    ///
    /// `rerank` controls whether the reranker is consulted for a fresh
    /// (post-embed) result; it does not suppress reranking already baked into
    /// a promoted L2/L3 entry.
    pub async fn retrieve(
        &self,
        ctx: &RequestContext,
        query: &str,
        limit: usize,
        rerank: bool,
    ) -> Result<Vec<String>, PipelineError> {
        if query.is_empty() {
            return Err(PipelineError::InvalidInput("query must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(PipelineError::InvalidInput("limit must be positive".to_string()));
        }

        let request_id = ctx.request_id();
        let key = cache_key(query, limit);

        // Step 2: L1 probe.
        if let Some(result) = self.l1.get(&key) {
            info!(%request_id, cache_key = %key, "L1 hit");
            return Ok(result);
        }

        // Step 3: L2 probe.
        if ctx.is_expired() {
            return Err(PipelineError::DeadlineExceeded);
        }
        match timeout(ctx.remaining(), self.kv_cache.get(&key)).await {
            Ok(Ok(Some(bytes))) => match serde_json::from_slice::<Vec<String>>(&bytes) {
                Ok(result) => {
                    info!(%request_id, cache_key = %key, "L2 hit, promoting to L1");
                    self.l1.set(key.clone(), result.clone());
                    return Ok(result);
                }
                Err(e) => {
                    let err = KvCacheError::Corrupt {
                        key: key.clone(),
                        reason: e.to_string(),
                    };
                    warn!(%request_id, cache_key = %key, error = %err, "L2 entry corrupt, treating as miss");
                }
            },
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                warn!(%request_id, cache_key = %key, error = %e, "L2 unavailable, treating as miss");
            }
            Err(_) => return Err(PipelineError::DeadlineExceeded),
        }

        // Step 4: embed.
        if ctx.is_expired() {
            return Err(PipelineError::DeadlineExceeded);
        }
        let embed_started = StdInstant::now();
        let vectors = timeout(
            ctx.remaining(),
            self.embedder.embed(&[query.to_string()], TaskType::RetrievalQuery),
        )
        .await
        .unwrap_or_default();
        info!(
            %request_id,
            duration_ms = embed_started.elapsed().as_millis() as u64,
            "embed call complete"
        );

        let Some(query_vector) = vectors.into_iter().next() else {
            info!(%request_id, cache_key = %key, "embedding unavailable, returning empty result");
            return Ok(Vec::new());
        };

        // Step 5: L3 probe.
        if let Some(mut result) = self.l3.lookup(&query_vector) {
            if rerank {
                if ctx.is_expired() {
                    return Err(PipelineError::DeadlineExceeded);
                }
                let rerank_started = StdInstant::now();
                result = timeout(ctx.remaining(), self.reranker.rerank(query, result))
                    .await
                    .map_err(|_| PipelineError::DeadlineExceeded)??;
                info!(
                    %request_id,
                    duration_ms = rerank_started.elapsed().as_millis() as u64,
                    "L3 hit, re-reranked against current query"
                );
            } else {
                info!(%request_id, cache_key = %key, "L3 hit");
            }

            self.l1.set(key.clone(), result.clone());
            self.best_effort_l2_set(ctx, &key, &result).await;
            return Ok(result);
        }

        // Step 6: miss — fetch from the vector store.
        if ctx.is_expired() {
            return Err(PipelineError::DeadlineExceeded);
        }
        let store_started = StdInstant::now();
        let mut result = timeout(
            ctx.remaining(),
            self.vector_store.find_similar(&query_vector, limit),
        )
        .await
        .map_err(|_| PipelineError::DeadlineExceeded)??;
        info!(
            %request_id,
            duration_ms = store_started.elapsed().as_millis() as u64,
            "vector store query complete"
        );

        if rerank && !result.is_empty() {
            if ctx.is_expired() {
                return Err(PipelineError::DeadlineExceeded);
            }
            let rerank_started = StdInstant::now();
            result = timeout(ctx.remaining(), self.reranker.rerank(query, result))
                .await
                .map_err(|_| PipelineError::DeadlineExceeded)??;
            info!(
                %request_id,
                duration_ms = rerank_started.elapsed().as_millis() as u64,
                "reranked vector store miss"
            );
        }

        // Step 7: admit everywhere.
        info!(%request_id, cache_key = %key, "miss, admitting into L1/L2/L3");
        self.l1.set(key.clone(), result.clone());
        self.l3.append(query_vector, result.clone());
        self.best_effort_l2_set(ctx, &key, &result).await;

        Ok(result)
    }

    /// Embeds `text` with `RETRIEVAL_DOCUMENT` and persists it. A dimension
    /// mismatch between the embedder's output and the store's configured
    /// dimension is propagated as a fatal [`PipelineError::StoreUnavailable`]
    /// (wrapping [`crate::vectordb::VectorDbError::DimensionMismatch`]).
    pub async fn store(&self, ctx: &RequestContext, text: &str) -> Result<StoredRow, PipelineError> {
        if text.is_empty() {
            return Err(PipelineError::InvalidInput("text must not be empty".to_string()));
        }

        let vectors = timeout(
            ctx.remaining(),
            self.embedder
                .embed(&[text.to_string()], TaskType::RetrievalDocument),
        )
        .await
        .unwrap_or_default();

        let Some(vector) = vectors.into_iter().next() else {
            return Err(PipelineError::EmbeddingUnavailable);
        };

        let row = timeout(ctx.remaining(), self.vector_store.store(vector, text.to_string()))
            .await
            .map_err(|_| PipelineError::DeadlineExceeded)??;

        Ok(row)
    }

    /// L1 + L2 admission count (used by tests and the admin "clear cache"
    /// confirmation, not part of the hot path).
    pub fn l1_len(&self) -> usize {
        self.l1.len()
    }

    /// L3 entry count.
    pub fn l3_len(&self) -> usize {
        self.l3.len()
    }

    /// Clears L1 and L3. The caller is responsible for flushing L2
    /// separately since it is shared with other processes.
    pub fn clear_local_caches(&self) {
        self.l1.clear();
        self.l3.clear();
    }

    /// Direct access to the L2 store, for the `/test/redis-cache` and
    /// `/test/clear-cache` admin endpoints.
    pub fn kv_cache(&self) -> &Arc<dyn KVCache> {
        &self.kv_cache
    }

    async fn best_effort_l2_set(&self, ctx: &RequestContext, key: &str, result: &[String]) {
        let Ok(encoded) = serde_json::to_vec(result) else {
            warn!(cache_key = %key, "failed to JSON-encode result for L2 admission");
            return;
        };

        match timeout(ctx.remaining(), self.kv_cache.set(key, encoded)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(cache_key = %key, error = %e, "L2 admission write failed"),
            Err(_) => warn!(cache_key = %key, "L2 admission write timed out"),
        }
    }
}
