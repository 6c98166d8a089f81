use axum::Json;
use axum::extract::{Path, State};

use crate::infra::http::api::error::ApiError;
use crate::infra::http::api::models::{PersonFilmResponse, PersonResponse};
use crate::infra::http::api::params::{ApiQuery, SearchQuery};
use crate::infra::http::api::state::ApiState;

pub async fn get_person(
    State(state): State<ApiState>,
    Path(person_id): Path<String>,
) -> Result<Json<PersonResponse>, ApiError> {
    let details = state
        .persons
        .details(&person_id)
        .await
        .map_err(|err| ApiError::store("infra::http::api::persons::get", err))?;

    match details {
        Some(details) => Ok(Json(details.into())),
        None => Err(ApiError::not_found("person not found")),
    }
}

/// Unknown people and people without credits both yield `[]`.
pub async fn list_person_films(
    State(state): State<ApiState>,
    Path(person_id): Path<String>,
) -> Result<Json<Vec<PersonFilmResponse>>, ApiError> {
    let aggregate = state
        .persons
        .films(&person_id)
        .await
        .map_err(|err| ApiError::store("infra::http::api::persons::films", err))?;

    Ok(Json(aggregate.films.into_iter().map(Into::into).collect()))
}

pub async fn search_persons(
    State(state): State<ApiState>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<Vec<PersonResponse>>, ApiError> {
    let page = query.page()?;
    let text = query.text()?;

    let people = state
        .persons
        .search(text, page)
        .await
        .map_err(|err| ApiError::store("infra::http::api::persons::search", err))?;

    Ok(Json(people.into_iter().map(Into::into).collect()))
}
