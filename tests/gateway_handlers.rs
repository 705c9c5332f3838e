//! Integration tests for the `/test/*` admin surface, driven end-to-end
//! through the axum router with every external collaborator mocked.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use retrieval_middleware::cache::{ExactCacheHandle, MockKVCache, SemanticCacheHandle};
use retrieval_middleware::config::Config;
use retrieval_middleware::embedding::MockEmbedder;
use retrieval_middleware::gateway::build_router;
use retrieval_middleware::lifecycle::AppContext;
use retrieval_middleware::pipeline::MemoryInterface;
use retrieval_middleware::reranker::MockReranker;
use retrieval_middleware::vectordb::MockVectorStore;
use serde_json::Value;
use std::sync::Mutex;
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

const DIM: usize = 4;

fn test_config() -> Config {
    Config {
        db_user: "app".to_string(),
        db_password: "secret".to_string(),
        db_host: "localhost".to_string(),
        db_port: 5432,
        db_name: "retrieval".to_string(),
        db_pool_size: 5,
        db_max_overflow: 10,
        db_pool_timeout_secs: 30,
        db_pool_recycle_secs: 1800,
        gemini_api_key: "test-key".to_string(),
        redis_url: "redis://localhost:6379".to_string(),
        bind_addr: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
    }
}

struct Harness {
    embedder: MockEmbedder,
    store: MockVectorStore,
    kv: MockKVCache,
    router: axum::Router,
}

fn harness() -> Harness {
    let embedder = MockEmbedder::new(DIM);
    let store = MockVectorStore::with_dimension(DIM);
    let reranker = MockReranker::new();
    let kv = MockKVCache::new();

    let memory = Arc::new(MemoryInterface::new(
        Arc::new(embedder.clone()),
        Arc::new(store.clone()),
        Arc::new(reranker),
        Arc::new(kv.clone()),
        ExactCacheHandle::new(),
        SemanticCacheHandle::new(),
    ));

    let ctx = Arc::new(AppContext::for_tests(test_config(), memory));
    let router = build_router(ctx);

    Harness {
        embedder,
        store,
        kv,
        router,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn liveness_returns_ok() {
    let h = harness();
    let response = h
        .router
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn retrieve_returns_results_and_request_id_header() {
    let h = harness();
    h.embedder.register("fox", vec![1.0, 0.0, 0.0, 0.0]);
    h.store
        .store(vec![1.0, 0.0, 0.0, 0.0], "the quick fox".to_string())
        .await
        .unwrap();

    let response = h
        .router
        .oneshot(
            Request::builder()
                .uri("/test/retrieve?query=fox&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body = body_json(response).await;
    assert_eq!(body["query"], "fox");
    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0], "the quick fox");
}

#[tokio::test]
async fn retrieve_rejects_empty_query_with_4xx() {
    let h = harness();
    let response = h
        .router
        .oneshot(
            Request::builder()
                .uri("/test/retrieve?query=&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn embed_and_store_persists_and_reports_vector_length() {
    let h = harness();
    h.embedder.register("new document", vec![1.0, 1.0, 1.0, 1.0]);

    let response = h
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/test/embed-and-store")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"new document"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["text"], "new document");
    assert_eq!(body["vector_length"], DIM);
    assert_eq!(h.store.len(), 1);
}

#[tokio::test]
async fn redis_cache_lists_decoded_entries() {
    let h = harness();
    h.kv.set("fox::5", serde_json::to_vec(&vec!["a", "b"]).unwrap())
        .await
        .unwrap();

    let response = h
        .router
        .oneshot(
            Request::builder()
                .uri("/test/redis-cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["entries"]["fox::5"], serde_json::json!(["a", "b"]));
}

#[tokio::test]
async fn clear_cache_empties_every_tier() {
    let h = harness();
    h.embedder.register("fox", vec![1.0, 0.0, 0.0, 0.0]);
    h.store
        .store(vec![1.0, 0.0, 0.0, 0.0], "a".to_string())
        .await
        .unwrap();

    let warm = h
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/test/retrieve?query=fox&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(warm.status(), StatusCode::OK);
    assert!(h.kv.len() > 0);

    let response = h
        .router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/test/clear-cache")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(h.kv.is_empty());
}

/// Captures every `request_id` field logged on a tracing event, so a test can
/// assert the id the pipeline logged matches the id returned to the client.
struct RequestIdCapture {
    ids: Arc<Mutex<Vec<String>>>,
}

struct RequestIdVisitor<'a>(&'a mut Option<String>);

impl tracing::field::Visit for RequestIdVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "request_id" {
            *self.0 = Some(format!("{value:?}"));
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for RequestIdCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut captured = None;
        event.record(&mut RequestIdVisitor(&mut captured));
        if let Some(id) = captured {
            self.ids.lock().unwrap().push(id);
        }
    }
}

#[tokio::test]
async fn retrieve_logs_the_same_request_id_as_the_response_header() {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(RequestIdCapture {
        ids: captured.clone(),
    });
    let _guard = tracing::subscriber::set_default(subscriber);

    let h = harness();
    h.embedder.register("fox", vec![1.0, 0.0, 0.0, 0.0]);
    h.store
        .store(vec![1.0, 0.0, 0.0, 0.0], "a".to_string())
        .await
        .unwrap();

    let response = h
        .router
        .oneshot(
            Request::builder()
                .uri("/test/retrieve?query=fox&limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let header_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let logged = captured.lock().unwrap();
    assert!(
        logged.iter().any(|id| id.contains(&header_id)),
        "expected a log line carrying request_id {header_id}, got {logged:?}"
    );
}
