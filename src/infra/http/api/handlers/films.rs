use axum::Json;
use axum::extract::{Path, State};

use crate::application::films::SORTABLE_FIELDS;
use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{FilmDetailResponse, FilmSummaryResponse};
use crate::infra::http::api::params::{ApiQuery, FilmListQuery, SearchQuery, sort_spec};
use crate::infra::http::api::state::ApiState;

const DEFAULT_SORT: &str = "-imdb_rating";

pub async fn list_films(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<FilmListQuery>,
) -> Result<Json<Vec<FilmSummaryResponse>>, ApiError> {
    let page = query.page()?;
    let sort = sort_spec(query.sort.as_deref(), DEFAULT_SORT, SORTABLE_FIELDS)?;

    let films = state
        .films
        .list(page, sort, query.genre())
        .await
        .map_err(|err| ApiError::store("infra::http::api::films::list", err))?;

    Ok(Json(films.into_iter().map(Into::into).collect()))
}

pub async fn search_films(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<FilmSummaryResponse>>, ApiError> {
    let page = query.page()?;
    let text = query.text()?;

    let films = state
        .films
        .search(text, page)
        .await
        .map_err(|err| ApiError::store("infra::http::api::films::search", err))?;

    Ok(Json(films.into_iter().map(Into::into).collect()))
}

pub async fn get_film(
    State(state): State<ApiState>,
    Path(film_id): Path<String>,
) -> Result<Json<FilmDetailResponse>, ApiError> {
    let film = state
        .films
        .get_by_id(&film_id)
        .await
        .map_err(|err| ApiError::store("infra::http::api::films::get", err))?;

    match film {
        Some(film) => Ok(Json(film.into())),
        None => Err(ApiError::not_found("film not found")),
    }
}
