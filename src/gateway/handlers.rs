//! Request handlers for the admin/test HTTP surface described in §6.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;
use crate::constants::DEFAULT_LIMIT;
use crate::lifecycle::AppContext;
use crate::pipeline::RequestContext;
use crate::pipeline::context::DEFAULT_REQUEST_TIMEOUT;

pub type SharedContext = Arc<AppContext>;

#[derive(Deserialize)]
pub struct RetrieveQuery {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    rerank: Option<bool>,
}

#[derive(Serialize)]
pub struct RetrieveResponse {
    query: String,
    results: Vec<String>,
    count: usize,
}

pub async fn retrieve(
    State(ctx): State<SharedContext>,
    Extension(request_id): Extension<Uuid>,
    Query(params): Query<RetrieveQuery>,
) -> Result<Json<RetrieveResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let rerank = params.rerank.unwrap_or(true);
    let request_ctx = RequestContext::with_id(request_id, DEFAULT_REQUEST_TIMEOUT);

    let results = ctx
        .memory()
        .retrieve(&request_ctx, &params.query, limit, rerank)
        .await?;

    Ok(Json(RetrieveResponse {
        query: params.query,
        count: results.len(),
        results,
    }))
}

#[derive(Deserialize)]
pub struct EmbedAndStoreRequest {
    text: String,
}

#[derive(Serialize)]
pub struct EmbedAndStoreResponse {
    text: String,
    stored_id: i64,
    vector_length: usize,
}

pub async fn embed_and_store(
    State(ctx): State<SharedContext>,
    Extension(request_id): Extension<Uuid>,
    Json(body): Json<EmbedAndStoreRequest>,
) -> Result<Json<EmbedAndStoreResponse>, ApiError> {
    let request_ctx = RequestContext::with_id(request_id, DEFAULT_REQUEST_TIMEOUT);
    let row = ctx.memory().store(&request_ctx, &body.text).await?;

    Ok(Json(EmbedAndStoreResponse {
        text: row.text,
        stored_id: row.id,
        vector_length: row.vector.len(),
    }))
}

#[derive(Serialize)]
pub struct RedisCacheResponse {
    count: usize,
    entries: HashMap<String, Value>,
}

pub async fn redis_cache(State(ctx): State<SharedContext>) -> Result<Json<RedisCacheResponse>, ApiError> {
    let kv = ctx.memory().kv_cache();
    let keys = kv
        .keys("*")
        .await
        .map_err(|e| ApiError::CacheFailure(format!("failed to list L2 keys: {e}")))?;

    let mut entries = HashMap::with_capacity(keys.len());
    for key in keys {
        if let Ok(Some(bytes)) = kv.get(&key).await {
            let decoded: Value =
                serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String("<undecodable>".to_string()));
            entries.insert(key, decoded);
        }
    }

    Ok(Json(RedisCacheResponse {
        count: entries.len(),
        entries,
    }))
}

#[derive(Serialize)]
pub struct ClearCacheResponse {
    message: String,
}

pub async fn clear_cache(State(ctx): State<SharedContext>) -> Result<Json<ClearCacheResponse>, ApiError> {
    ctx.memory().clear_local_caches();
    ctx.memory()
        .kv_cache()
        .flush()
        .await
        .map_err(|e| ApiError::CacheFailure(format!("failed to flush L2: {e}")))?;

    Ok(Json(ClearCacheResponse {
        message: "L1, L2, and L3 caches cleared".to_string(),
    }))
}

#[derive(Serialize)]
pub struct LivenessResponse {
    status: &'static str,
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "ok" })
}
