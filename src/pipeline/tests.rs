use std::sync::Arc;

use super::*;
use crate::cache::{ExactCacheHandle, MockKVCache, SemanticCacheHandle};
use crate::embedding::MockEmbedder;
use crate::reranker::mock::PanicReranker;
use crate::reranker::{MockReranker, Reranker};
use crate::vectordb::MockVectorStore;

const DIM: usize = 4;

fn ctx() -> RequestContext {
    RequestContext::with_default_timeout()
}

struct Harness {
    memory: MemoryInterface,
    embedder: MockEmbedder,
    store: MockVectorStore,
    reranker: MockReranker,
    kv: MockKVCache,
}

fn harness() -> Harness {
    let embedder = MockEmbedder::new(DIM);
    let store = MockVectorStore::with_dimension(DIM);
    let reranker = MockReranker::new();
    let kv = MockKVCache::new();

    let memory = MemoryInterface::new(
        Arc::new(embedder.clone()),
        Arc::new(store.clone()),
        Arc::new(reranker.clone()),
        Arc::new(kv.clone()),
        ExactCacheHandle::new(),
        SemanticCacheHandle::new(),
    );

    Harness {
        memory,
        embedder,
        store,
        reranker,
        kv,
    }
}

#[tokio::test]
async fn rejects_empty_query() {
    let h = harness();
    let err = h.memory.retrieve(&ctx(), "", 5, true).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[tokio::test]
async fn rejects_zero_limit() {
    let h = harness();
    let err = h.memory.retrieve(&ctx(), "fox", 0, true).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[tokio::test]
async fn scenario_1_l1_hit_skips_everything() {
    let h = harness();
    h.embedder.register("fox", vec![1.0, 0.0, 0.0, 0.0]);
    h.store.store(vec![1.0, 0.0, 0.0, 0.0], "a".to_string()).await.unwrap();

    let first = h.memory.retrieve(&ctx(), "fox", 5, true).await.unwrap();
    assert_eq!(first, vec!["a".to_string()]);

    // A second lookup must be served entirely from L1: swap the reranker for
    // one that panics if invoked, and assert the embedder/store are untouched.
    let l1_only = MemoryInterface::new(
        Arc::new(h.embedder.clone()),
        Arc::new(h.store.clone()),
        Arc::new(PanicReranker),
        Arc::new(h.kv.clone()),
        h.memory.l1.clone(),
        SemanticCacheHandle::new(),
    );
    let embed_calls_before = h.embedder.call_count();
    let find_calls_before = h.store.find_similar_call_count();

    let second = l1_only.retrieve(&ctx(), "fox", 5, true).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(h.embedder.call_count(), embed_calls_before);
    assert_eq!(h.store.find_similar_call_count(), find_calls_before);
}

#[tokio::test]
async fn scenario_2_l2_promotion_skips_embedder() {
    let h = harness();
    h.kv.set("fox::5", serde_json::to_vec(&vec!["a", "b"]).unwrap())
        .await
        .unwrap();

    let result = h.memory.retrieve(&ctx(), "fox", 5, true).await.unwrap();
    assert_eq!(result, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(h.memory.l1_len(), 1);
    assert_eq!(h.embedder.call_count(), 0);
}

#[tokio::test]
async fn scenario_3_l3_approximate_hit_rereranks_for_current_query() {
    let h = harness();
    let v1 = vec![1.0, 0.0, 0.0, 0.0];
    let v2 = vec![0.99, 0.14, 0.0, 0.0]; // cos(v1, v2) ~ 0.99 >= 0.90

    h.memory.l3.append(v1, vec!["x".to_string(), "y".to_string(), "zzz".to_string()]);
    h.embedder.register("q2", v2);

    let result = h.memory.retrieve(&ctx(), "q2", 5, true).await.unwrap();

    // MockReranker sorts by descending length: "zzz" (3) ties x/y (1) broken by original order.
    assert_eq!(result, vec!["zzz".to_string(), "x".to_string(), "y".to_string()]);
    assert_eq!(h.memory.l3_len(), 1, "L3 is not re-inserted on an L3 hit");
    assert_eq!(h.store.find_similar_call_count(), 0);

    let l1_entry = h.memory.l1.get("q2::5").unwrap();
    assert_eq!(l1_entry, result);
    let l2_entry: Vec<String> =
        serde_json::from_slice(&h.kv.get("q2::5").await.unwrap().unwrap()).unwrap();
    assert_eq!(l2_entry, result);
}

#[tokio::test]
async fn scenario_4_full_miss_admits_everywhere() {
    let h = harness();
    h.embedder.register("new", vec![0.1, 0.2, 0.3, 0.4]);
    h.store.store(vec![0.1, 0.2, 0.3, 0.4], "alpha".to_string()).await.unwrap();
    h.store.store(vec![0.4, 0.3, 0.2, 0.1], "beta".to_string()).await.unwrap();
    h.store.store(vec![0.2, 0.2, 0.2, 0.2], "gamma".to_string()).await.unwrap();

    let result = h.memory.retrieve(&ctx(), "new", 3, true).await.unwrap();
    assert_eq!(result.len(), 3);

    assert_eq!(h.memory.l1.get("new::3"), Some(result.clone()));
    assert_eq!(h.memory.l3_len(), 1);
    let l2_entry: Vec<String> =
        serde_json::from_slice(&h.kv.get("new::3").await.unwrap().unwrap()).unwrap();
    assert_eq!(l2_entry, result);
}

#[tokio::test]
async fn scenario_5_embedding_failure_returns_empty_with_no_cache_writes() {
    let h = harness();
    h.embedder.fail_next_call();

    let result = h.memory.retrieve(&ctx(), "bad", 5, true).await.unwrap();
    assert_eq!(result, Vec::<String>::new());
    assert_eq!(h.memory.l1_len(), 0);
    assert_eq!(h.memory.l3_len(), 0);
    assert_eq!(h.store.find_similar_call_count(), 0);
    assert!(h.kv.get("bad::5").await.unwrap().is_none());
}

#[tokio::test]
async fn scenario_6_lru_eviction_drops_exactly_the_oldest() {
    let h = harness();
    for i in 1..=51 {
        let text = format!("q_{i}");
        h.embedder.register(&text, vec![i as f32, 0.0, 0.0, 0.0]);
        h.store.store(vec![i as f32, 0.0, 0.0, 0.0], text.clone()).await.unwrap();
        h.memory.retrieve(&ctx(), &text, 5, true).await.unwrap();
    }

    assert_eq!(h.memory.l1_len(), 50);
    assert_eq!(h.memory.l1.get("q_1::5"), None);
    for i in 2..=51 {
        assert!(
            h.memory.l1.get(&format!("q_{i}::5")).is_some(),
            "q_{i} should still be present"
        );
    }
}

#[tokio::test]
async fn reranker_failure_propagates_as_error() {
    let h = harness();
    h.embedder.register("new", vec![0.1, 0.2, 0.3, 0.4]);
    h.store.store(vec![0.1, 0.2, 0.3, 0.4], "alpha".to_string()).await.unwrap();
    h.reranker.set_should_fail(true);

    let err = h.memory.retrieve(&ctx(), "new", 3, true).await.unwrap_err();
    assert!(matches!(err, PipelineError::RerankerFailure(_)));
}

#[tokio::test]
async fn rerank_disabled_skips_reranker_on_fresh_fetch() {
    let h = harness();
    h.embedder.register("new", vec![0.1, 0.2, 0.3, 0.4]);
    h.store.store(vec![0.1, 0.2, 0.3, 0.4], "alpha".to_string()).await.unwrap();

    let result = h.memory.retrieve(&ctx(), "new", 3, false).await.unwrap();
    assert_eq!(result, vec!["alpha".to_string()]);
    assert_eq!(h.reranker.call_count(), 0);
}

#[tokio::test]
async fn store_rejects_empty_text() {
    let h = harness();
    let err = h.memory.store(&ctx(), "").await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[tokio::test]
async fn store_persists_with_retrieval_document_task_type() {
    let h = harness();
    h.embedder.register("doc text", vec![1.0, 1.0, 1.0, 1.0]);

    let row = h.memory.store(&ctx(), "doc text").await.unwrap();
    assert_eq!(row.text, "doc text");
    assert_eq!(h.store.len(), 1);

    let calls = h.embedder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1, crate::embedding::TaskType::RetrievalDocument);
}

#[tokio::test]
async fn store_propagates_dimension_mismatch() {
    let h = harness();
    h.embedder.register("doc", vec![1.0, 1.0]); // wrong dimension
    let err = h.memory.store(&ctx(), "doc").await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::StoreUnavailable(crate::vectordb::VectorDbError::DimensionMismatch { .. })
    ));
}

#[tokio::test]
async fn store_returns_embedding_unavailable_on_empty_embed() {
    let h = harness();
    h.embedder.fail_next_call();
    let err = h.memory.store(&ctx(), "doc").await.unwrap_err();
    assert!(matches!(err, PipelineError::EmbeddingUnavailable));
}

#[tokio::test]
async fn rerank_is_a_permutation_of_its_input() {
    let reranker = MockReranker::new();
    let docs = vec!["a".to_string(), "bb".to_string(), "ccc".to_string()];
    let reranked = reranker.rerank("q", docs.clone()).await.unwrap();

    let mut a = docs;
    let mut b = reranked;
    a.sort();
    b.sort();
    assert_eq!(a, b);
}

#[tokio::test]
async fn concurrent_retrievals_never_exceed_tier_capacities() {
    let h = Arc::new(harness());
    for i in 0..80 {
        let text = format!("concurrent_{i}");
        h.embedder.register(&text, vec![i as f32, 1.0, 0.0, 0.0]);
        h.store
            .store(vec![i as f32, 1.0, 0.0, 0.0], text.clone())
            .await
            .unwrap();
    }

    let calls = (0..80).map(|i| {
        let h = Arc::clone(&h);
        async move {
            let text = format!("concurrent_{i}");
            h.memory.retrieve(&ctx(), &text, 5, true).await
        }
    });

    let results = futures::future::join_all(calls).await;
    assert!(results.iter().all(|r| r.is_ok()));
    assert!(h.memory.l1_len() <= 50, "L1 exceeded its capacity under concurrent load");
    assert!(h.memory.l3_len() <= 10, "L3 exceeded its capacity under concurrent load");
}

#[tokio::test]
async fn clear_local_caches_empties_l1_and_l3() {
    let h = harness();
    h.embedder.register("new", vec![0.1, 0.2, 0.3, 0.4]);
    h.store.store(vec![0.1, 0.2, 0.3, 0.4], "alpha".to_string()).await.unwrap();
    h.memory.retrieve(&ctx(), "new", 3, true).await.unwrap();

    assert!(h.memory.l1_len() > 0);
    assert!(h.memory.l3_len() > 0);

    h.memory.clear_local_caches();
    assert_eq!(h.memory.l1_len(), 0);
    assert_eq!(h.memory.l3_len(), 0);
}
