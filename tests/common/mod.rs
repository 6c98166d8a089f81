#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use marquee::application::registry::{AppContext, ServiceRegistry};
use marquee::cache::{CacheConfig, CacheState, CacheStore};
use marquee::infra::http::{self, ApiState};
use marquee::infra::search::{MemoryDocumentStore, SeedData};

pub const LUCAS: &str = "p-lucas";
pub const FORD: &str = "p-ford";
pub const HAMILL: &str = "p-hamill";
pub const NOBODY: &str = "p-nobody";

pub const ACTION: &str = "g-action";
pub const DRAMA: &str = "g-drama";
pub const SCIFI: &str = "g-scifi";

fn genre(id: &str) -> Value {
    let name = match id {
        ACTION => "Action",
        DRAMA => "Drama",
        _ => "Sci-Fi",
    };
    json!({ "id": id, "name": name })
}

fn person(id: &str) -> Value {
    let full_name = match id {
        LUCAS => "George Lucas",
        FORD => "Harrison Ford",
        HAMILL => "Mark Hamill",
        _ => "Jane Nobody",
    };
    json!({ "id": id, "full_name": full_name })
}

fn people(ids: &[&str]) -> Value {
    Value::Array(ids.iter().map(|id| person(id)).collect())
}

fn genres(ids: &[&str]) -> Value {
    Value::Array(ids.iter().map(|id| genre(id)).collect())
}

/// Small catalogue with overlapping credits across roles.
pub fn seed() -> SeedData {
    SeedData {
        films: vec![
            json!({
                "id": "f-1", "title": "Star Wars", "imdb_rating": 8.6,
                "description": "A farm boy joins a rebellion.",
                "genres": genres(&[SCIFI, ACTION]),
                "directors": people(&[LUCAS]),
                "writers": people(&[LUCAS]),
                "actors": people(&[FORD, HAMILL]),
            }),
            json!({
                "id": "f-2", "title": "The Empire Strikes Back", "imdb_rating": 8.7,
                "genres": genres(&[SCIFI, ACTION]),
                "directors": [],
                "writers": people(&[LUCAS]),
                "actors": people(&[FORD, HAMILL]),
            }),
            json!({
                "id": "f-3", "title": "Blade Runner", "imdb_rating": 8.1,
                "genres": genres(&[SCIFI, DRAMA]),
                "directors": [], "writers": [],
                "actors": people(&[FORD]),
            }),
            json!({
                "id": "f-4", "title": "Witness", "imdb_rating": 7.4,
                "genres": genres(&[DRAMA]),
                "directors": [], "writers": [],
                "actors": people(&[FORD]),
            }),
            json!({
                "id": "f-5", "title": "Untitled Drama",
                "genres": genres(&[DRAMA]),
            }),
        ],
        genres: vec![genre(SCIFI), genre(DRAMA), genre(ACTION)],
        persons: vec![person(LUCAS), person(FORD), person(HAMILL), person(NOBODY)],
    }
}

pub fn documents() -> Arc<MemoryDocumentStore> {
    Arc::new(MemoryDocumentStore::from_seed(seed()))
}

/// Full application router over `documents`, cached when `cache` is set.
pub fn app(documents: Arc<MemoryDocumentStore>, cache: Option<Arc<dyn CacheStore>>) -> Router {
    let context = AppContext::new(documents, cache, 1000);
    let registry = ServiceRegistry::from_context(&context);
    let api = ApiState::from_registry(&registry).expect("services registered");
    let cache = context
        .cache
        .clone()
        .map(|store| CacheState::new(CacheConfig::default(), store));
    http::build_router(api, cache)
}

pub async fn send(router: &Router, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    (status, headers, body)
}

pub async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(router, uri).await;
    let value = serde_json::from_slice(&body).expect("body should be JSON");
    (status, value)
}

pub fn ids(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("array body")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}
