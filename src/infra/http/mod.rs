//! HTTP surface: router assembly and cross-cutting layers.

pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::RequestContext;

use axum::{
    Router,
    http::Uri,
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Redirect, Response},
};

use crate::cache::{CacheState, response_cache_layer};

use self::api::error::ApiError;
use self::middleware::{log_responses, set_request_context};

/// Full application router.
///
/// Layers, outermost first: request id, failure logging, response cache
/// (when `cache` is set), then routing with slash canonicalisation.
pub fn build_router(api: ApiState, cache: Option<CacheState>) -> Router {
    let mut router = build_api_router()
        .fallback(canonicalize_path)
        .with_state(api);

    if let Some(cache) = cache {
        router = router.layer(from_fn_with_state(cache, response_cache_layer));
    }

    router
        .layer(from_fn(log_responses))
        .layer(from_fn(set_request_context))
}

/// Redirect to the slash-terminated path; anything already terminated is unknown.
async fn canonicalize_path(uri: Uri) -> Response {
    let path = uri.path();
    if path.ends_with('/') {
        return ApiError::not_found("Not Found").into_response();
    }

    let target = match uri.query() {
        Some(query) => format!("{path}/?{query}"),
        None => format!("{path}/"),
    };
    Redirect::temporary(&target).into_response()
}
