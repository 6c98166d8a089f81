//! Read-through response cache middleware.
//!
//! GET responses are looked up by [`CacheKey`] before the handler runs. On a
//! miss the handler's 200 JSON body is buffered, written to the store and
//! replayed to the caller. Concurrent misses on one key each run the handler
//! and each write; the last write wins.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use metrics::counter;
use serde::de::IgnoredAny;
use tracing::{debug, instrument, warn};

use crate::application::error::ErrorReport;

use super::{CacheConfig, CacheStore, keys::CacheKey, response::buffer_response};

pub(crate) const HIT_TOTAL: &str = "marquee_cache_hit_total";
pub(crate) const MISS_TOTAL: &str = "marquee_cache_miss_total";
pub(crate) const BYPASS_TOTAL: &str = "marquee_cache_bypass_total";
pub(crate) const STORE_ERROR_TOTAL: &str = "marquee_cache_store_error_total";

/// Shared cache state for middleware.
#[derive(Clone)]
pub struct CacheState {
    pub config: CacheConfig,
    pub store: Arc<dyn CacheStore>,
}

impl CacheState {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>) -> Self {
        Self { config, store }
    }
}

#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn response_cache_layer(
    State(cache): State<CacheState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        counter!(BYPASS_TOTAL).increment(1);
        debug!(cache = "response", outcome = "bypass", method = %request.method(), "not cacheable");
        return next.run(request).await;
    }

    let key = CacheKey::from_uri(request.uri());

    match cache.store.get(key.as_str()).await {
        Ok(Some(body)) if is_json(&body) => {
            counter!(HIT_TOTAL).increment(1);
            debug!(cache = "response", outcome = "hit", key = %key, "serving cached response");
            return json_response(body);
        }
        Ok(Some(_)) => {
            warn!(cache = "response", key = %key, "discarding cached entry that is not JSON");
        }
        Ok(None) => {}
        Err(error) => {
            counter!(STORE_ERROR_TOTAL).increment(1);
            warn!(cache = "response", op = "get", key = %key, %error, "cache store read failed");
        }
    }

    counter!(MISS_TOTAL).increment(1);
    debug!(cache = "response", outcome = "miss", key = %key, "executing handler");

    let response = next.run(request).await;

    if response.status().is_redirection() {
        counter!(BYPASS_TOTAL).increment(1);
        debug!(cache = "response", outcome = "bypass", status = %response.status(), "redirect not cached");
        return response;
    }
    if response.status() != StatusCode::OK {
        return response;
    }

    let buffered = match buffer_response(response).await {
        Ok(buffered) => buffered,
        Err((mut rebuilt, error)) => {
            warn!(cache = "response", key = %key, %error, "handler body could not be read");
            *rebuilt.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            ErrorReport::from_error(
                "cache::middleware::response_cache_layer",
                StatusCode::INTERNAL_SERVER_ERROR,
                &error,
            )
            .attach(&mut rebuilt);
            return rebuilt;
        }
    };

    let body = buffered.body().clone();
    if body.len() > cache.config.max_body_bytes {
        debug!(cache = "response", key = %key, bytes = body.len(), "body too large to cache");
    } else if !is_json(&body) {
        debug!(cache = "response", key = %key, "body is not JSON; not cached");
    } else if let Err(error) = cache.store.set(key.as_str(), body, cache.config.ttl).await {
        counter!(STORE_ERROR_TOTAL).increment(1);
        warn!(cache = "response", op = "set", key = %key, %error, "cache store write failed");
    } else {
        debug!(cache = "response", outcome = "store", key = %key, "cached response");
    }

    buffered.into_response()
}

fn is_json(body: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(body).is_ok()
}

fn json_response(body: Bytes) -> Response {
    let mut response = Body::from(body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
