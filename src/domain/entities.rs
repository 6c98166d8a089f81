//! Documents mirrored from the search store.
//!
//! Field names follow the stored documents, so these types deserialize
//! straight from a search hit's `_source`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    pub id: String,
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
    #[serde(default)]
    pub genres: Vec<GenreRef>,
    #[serde(default)]
    pub directors: Vec<PersonRef>,
    #[serde(default)]
    pub writers: Vec<PersonRef>,
    #[serde(default)]
    pub actors: Vec<PersonRef>,
}

/// `id`, `title`, `imdb_rating` projection of a film.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub imdb_rating: Option<f64>,
}

/// Id-only projection of a film.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilmId {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub full_name: String,
}

/// Anything a per-role sub-query can project that carries a film id.
pub trait HasFilmId {
    fn film_id(&self) -> &str;
}

impl HasFilmId for FilmId {
    fn film_id(&self) -> &str {
        &self.id
    }
}

impl HasFilmId for FilmSummary {
    fn film_id(&self) -> &str {
        &self.id
    }
}
