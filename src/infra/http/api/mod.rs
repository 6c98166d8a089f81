//! Versioned read API.

pub mod error;
pub mod handlers;
pub mod models;
pub mod params;
pub mod state;

pub use state::ApiState;

use axum::{Router, routing::get};

/// Routes under `/api/v1`, all slash-terminated.
pub fn build_api_router() -> Router<ApiState> {
    Router::new()
        .route("/api/v1/film/", get(handlers::list_films))
        .route("/api/v1/film/search/", get(handlers::search_films))
        .route("/api/v1/film/{film_id}/", get(handlers::get_film))
        .route("/api/v1/genre/", get(handlers::list_genres))
        .route("/api/v1/genre/{genre_id}/", get(handlers::get_genre))
        .route("/api/v1/person/search/", get(handlers::search_persons))
        .route("/api/v1/person/{person_id}/", get(handlers::get_person))
        .route(
            "/api/v1/person/{person_id}/film/",
            get(handlers::list_person_films),
        )
}
