use axum::Json;
use axum::extract::{Path, State};

use crate::application::genres::SORTABLE_FIELDS;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::GenreResponse;
use crate::infra::http::api::params::{ApiQuery, GenreListQuery, sort_spec};
use crate::infra::http::api::state::ApiState;

const DEFAULT_SORT: &str = "name";

pub async fn list_genres(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<GenreListQuery>,
) -> Result<Json<Vec<GenreResponse>>, ApiError> {
    let page = query.page()?;
    let sort = sort_spec(query.sort.as_deref(), DEFAULT_SORT, SORTABLE_FIELDS)?;

    let genres = state
        .genres
        .list(page, sort)
        .await
        .map_err(|err| ApiError::store("infra::http::api::genres::list", err))?;

    Ok(Json(genres.into_iter().map(Into::into).collect()))
}

pub async fn get_genre(
    State(state): State<ApiState>,
    Path(genre_id): Path<String>,
) -> Result<Json<GenreResponse>, ApiError> {
    let genre = state
        .genres
        .get_by_id(&genre_id)
        .await
        .map_err(|err| ApiError::store("infra::http::api::genres::get", err))?;

    genre
        .map(|genre| Json(genre.into()))
        .ok_or_else(|| ApiError::not_found("Not Found"))
}
