//! Wire view models assembled from documents and aggregates.

use serde::Serialize;

use crate::application::persons::PersonDetails;
use crate::domain::aggregates::PersonFilm;
use crate::domain::entities::{FilmRecord, FilmSummary, GenreRecord, GenreRef, PersonRecord, PersonRef};
use crate::domain::types::Role;

#[derive(Debug, Serialize)]
pub struct GenreResponse {
    pub id: String,
    pub name: String,
}

impl From<GenreRecord> for GenreResponse {
    fn from(genre: GenreRecord) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
        }
    }
}

impl From<GenreRef> for GenreResponse {
    fn from(genre: GenreRef) -> Self {
        Self {
            id: genre.id,
            name: genre.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonRefResponse {
    pub id: String,
    pub full_name: String,
}

impl From<PersonRef> for PersonRefResponse {
    fn from(person: PersonRef) -> Self {
        Self {
            id: person.id,
            full_name: person.full_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilmDetailResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub imdb_rating: Option<f64>,
    pub genres: Vec<GenreResponse>,
    pub directors: Vec<PersonRefResponse>,
    pub writers: Vec<PersonRefResponse>,
    pub actors: Vec<PersonRefResponse>,
}

impl From<FilmRecord> for FilmDetailResponse {
    fn from(film: FilmRecord) -> Self {
        Self {
            id: film.id,
            title: film.title,
            description: film.description,
            imdb_rating: film.imdb_rating,
            genres: film.genres.into_iter().map(Into::into).collect(),
            directors: film.directors.into_iter().map(Into::into).collect(),
            writers: film.writers.into_iter().map(Into::into).collect(),
            actors: film.actors.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FilmSummaryResponse {
    pub id: String,
    pub title: String,
    pub imdb_rating: Option<f64>,
}

impl From<FilmSummary> for FilmSummaryResponse {
    fn from(film: FilmSummary) -> Self {
        Self {
            id: film.id,
            title: film.title,
            imdb_rating: film.imdb_rating,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub id: String,
    pub full_name: String,
    pub roles: Vec<Role>,
    pub film_ids: Vec<String>,
}

impl From<PersonDetails> for PersonResponse {
    fn from(details: PersonDetails) -> Self {
        let PersonRecord { id, full_name } = details.person;
        Self {
            id,
            full_name,
            roles: details.aggregate.roles,
            film_ids: details.aggregate.film_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PersonFilmResponse {
    pub id: String,
    pub title: String,
    pub imdb_rating: Option<f64>,
    pub roles: Vec<Role>,
}

impl From<PersonFilm> for PersonFilmResponse {
    fn from(entry: PersonFilm) -> Self {
        Self {
            id: entry.film.id,
            title: entry.film.title,
            imdb_rating: entry.film.imdb_rating,
            roles: entry.roles,
        }
    }
}
