use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Json, Router,
    body::Body,
    http::{Method, Request, StatusCode},
    middleware,
    response::Redirect,
    routing::get,
};
use bytes::Bytes;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};
use serde_json::json;
use tower::ServiceExt;

use marquee::cache::{
    CacheConfig, CacheError, CacheState, CacheStore, MemoryCacheStore, response_cache_layer,
};
use marquee::infra::telemetry;

struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<Bytes>, CacheError> {
        Err(CacheError::backend("unreachable"))
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::backend("unreachable"))
    }
}

fn app(store: Arc<dyn CacheStore>) -> Router {
    Router::new()
        .route(
            "/films/",
            get(|| async { Json(json!([{ "id": "f-1" }])) })
                .post(|| async { StatusCode::NO_CONTENT }),
        )
        .route("/films", get(|| async { Redirect::temporary("/films/") }))
        .layer(middleware::from_fn_with_state(
            CacheState::new(CacheConfig::default(), store),
            response_cache_layer,
        ))
}

async fn call(app: &Router, method: Method, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
        .status()
}

#[tokio::test]
async fn cache_paths_emit_expected_counters() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");
    telemetry::describe_metrics();

    let memory = Arc::new(MemoryCacheStore::new(
        NonZeroUsize::new(8).expect("non-zero"),
    ));
    let cached = app(memory);
    // miss, hit, hit
    for _ in 0..3 {
        assert_eq!(call(&cached, Method::GET, "/films/").await, StatusCode::OK);
    }
    // bypass on method, bypass on redirect (after its miss)
    assert_eq!(
        call(&cached, Method::POST, "/films/").await,
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        call(&cached, Method::GET, "/films").await,
        StatusCode::TEMPORARY_REDIRECT
    );

    // read error, miss, write error
    let degraded = app(Arc::new(UnreachableStore));
    assert_eq!(call(&degraded, Method::GET, "/films/").await, StatusCode::OK);

    let counters: HashMap<String, u64> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter_map(|(composite_key, _, _, value)| match value {
            DebugValue::Counter(count) => Some((composite_key.key().name().to_string(), count)),
            _ => None,
        })
        .collect();

    let expected = [
        ("marquee_cache_hit_total", 2),
        ("marquee_cache_miss_total", 3),
        ("marquee_cache_bypass_total", 2),
        ("marquee_cache_store_error_total", 2),
    ];

    for (metric, count) in expected {
        assert_eq!(counters.get(metric), Some(&count), "metric: {metric}");
    }
}
