//! Query-string parameters and their validation.
//!
//! Fields arrive as raw strings so malformed values surface as 422 responses
//! naming the offending parameter.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::application::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageParams, SortSpec};

use super::error::ApiError;

const MAX_PAGE_NUMBER: u32 = 1000;

/// `Query` extractor whose rejection is a 422 `ApiError`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| ApiError::unprocessable(rejection.body_text()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FilmListQuery {
    #[serde(rename = "page[number]")]
    pub page_number: Option<String>,
    #[serde(rename = "page[size]")]
    pub page_size: Option<String>,
    pub sort: Option<String>,
    #[serde(rename = "filter[genre]")]
    pub genre: Option<String>,
}

impl FilmListQuery {
    pub fn page(&self) -> Result<PageParams, ApiError> {
        page_params(
            ("page[number]", self.page_number.as_deref()),
            ("page[size]", self.page_size.as_deref()),
        )
    }

    /// Blank values mean "no filter".
    pub fn genre(&self) -> Option<&str> {
        self.genre
            .as_deref()
            .map(str::trim)
            .filter(|genre| !genre.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenreListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

impl GenreListQuery {
    pub fn page(&self) -> Result<PageParams, ApiError> {
        page_params(
            ("page", self.page.as_deref()),
            ("size", self.size.as_deref()),
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
}

impl SearchQuery {
    pub fn page(&self) -> Result<PageParams, ApiError> {
        page_params(
            ("page", self.page.as_deref()),
            ("size", self.size.as_deref()),
        )
    }

    pub fn text(&self) -> Result<&str, ApiError> {
        self.query
            .as_deref()
            .ok_or_else(|| ApiError::unprocessable("query parameter `query` is required"))
    }
}

/// Parse `-field` / `field` against the fields a listing can sort on.
pub fn sort_spec(raw: Option<&str>, default: &str, allowed: &[&str]) -> Result<SortSpec, ApiError> {
    let raw = raw.map(str::trim).filter(|raw| !raw.is_empty()).unwrap_or(default);
    let sort = SortSpec::parse_prefixed(raw)
        .map_err(|err| ApiError::unprocessable(format!("sort: {err}")))?;
    if !allowed.contains(&sort.field.as_str()) {
        return Err(ApiError::unprocessable(format!(
            "sort: unsupported field `{}`, expected one of {}",
            sort.field,
            allowed.join(", ")
        )));
    }
    Ok(sort)
}

fn page_params(
    (number_name, number): (&str, Option<&str>),
    (size_name, size): (&str, Option<&str>),
) -> Result<PageParams, ApiError> {
    let number = bounded(number_name, number, 1, MAX_PAGE_NUMBER)?;
    let size = bounded(size_name, size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;
    PageParams::new(number, size).map_err(|err| ApiError::unprocessable(err.to_string()))
}

fn bounded(name: &str, raw: Option<&str>, default: u32, max: u32) -> Result<u32, ApiError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u32>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(ApiError::unprocessable(format!(
            "{name} must be an integer between 1 and {max}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::application::pagination::SortDirection;

    #[test]
    fn pages_default_to_first_fifty() {
        let page = FilmListQuery::default().page().expect("defaults");
        assert_eq!((page.number(), page.size()), (1, 50));
    }

    #[test]
    fn rejects_out_of_range_or_non_numeric_pages() {
        for (number, size) in [("0", "10"), ("1", "1001"), ("abc", "10"), ("1", "-5"), ("1001", "1"), ("11", "1000")] {
            let query = GenreListQuery {
                page: Some(number.to_string()),
                size: Some(size.to_string()),
                sort: None,
            };
            let err = query.page().expect_err("invalid page");
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn sort_defaults_and_prefix() {
        let allowed = &["imdb_rating", "id"];

        let default = sort_spec(None, "-imdb_rating", allowed).expect("default sort");
        assert_eq!(default.field, "imdb_rating");
        assert_eq!(default.direction, SortDirection::Desc);

        let ascending = sort_spec(Some("id"), "-imdb_rating", allowed).expect("id sort");
        assert_eq!(ascending.direction, SortDirection::Asc);

        assert!(sort_spec(Some("-title"), "-imdb_rating", allowed).is_err());
        assert!(sort_spec(Some("-"), "-imdb_rating", allowed).is_err());
    }

    #[test]
    fn search_requires_query_text() {
        assert!(SearchQuery::default().text().is_err());

        let query = SearchQuery {
            query: Some("star".to_string()),
            ..SearchQuery::default()
        };
        assert_eq!(query.text().expect("text"), "star");
    }

    #[test]
    fn blank_genre_filter_is_ignored() {
        let query = FilmListQuery {
            genre: Some("  ".to_string()),
            ..FilmListQuery::default()
        };
        assert_eq!(query.genre(), None);
    }
}
