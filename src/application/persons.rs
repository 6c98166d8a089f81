//! Person lookups and role aggregation.
//!
//! Films store their directors, writers and actors as nested arrays, so a
//! person's filmography is rebuilt by issuing one nested term query per
//! [`Role`] and merging the hit lists (see [`crate::domain::aggregates`]).
//! The per-role queries are fanned out concurrently; results are
//! re-associated with their role before merging, so the output never depends
//! on which query finished first.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::application::pagination::PageParams;
use crate::application::query;
use crate::application::store::{Collection, DocumentStore, StoreError, decode, decode_all};
use crate::domain::aggregates::{PersonAggregate, PersonFilmAggregate, RoleHits};
use crate::domain::entities::{FilmId, FilmSummary, PersonRecord};
use crate::domain::types::Role;

const ID_FIELDS: &[&str] = &["id"];
const PERSON_FIELDS: &[&str] = &["id", "full_name"];
const SUMMARY_FIELDS: &[&str] = &["id", "title", "imdb_rating"];

/// A person document decorated with its role aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDetails {
    pub person: PersonRecord,
    pub aggregate: PersonAggregate,
}

#[derive(Clone)]
pub struct PersonService {
    store: Arc<dyn DocumentStore>,
    role_query_limit: u32,
}

impl PersonService {
    pub fn new(store: Arc<dyn DocumentStore>, role_query_limit: u32) -> Self {
        Self {
            store,
            role_query_limit,
        }
    }

    pub async fn get_person(&self, person_id: &str) -> Result<Option<PersonRecord>, StoreError> {
        self.store
            .get(Collection::Persons, person_id)
            .await?
            .map(|document| decode(Collection::Persons, document))
            .transpose()
    }

    /// Person document plus every role held and every film id.
    ///
    /// `Ok(None)` only when no person document exists; a person without any
    /// credits yields empty roles and film ids.
    #[instrument(skip(self))]
    pub async fn details(&self, person_id: &str) -> Result<Option<PersonDetails>, StoreError> {
        let Some(person) = self.get_person(person_id).await? else {
            return Ok(None);
        };

        self.decorate(person).await.map(Some)
    }

    /// Films of a person annotated with the roles held in each film.
    ///
    /// An unknown person id yields an empty aggregate rather than an error.
    #[instrument(skip(self))]
    pub async fn films(&self, person_id: &str) -> Result<PersonFilmAggregate, StoreError> {
        let Some(person) = self.get_person(person_id).await? else {
            return Ok(PersonFilmAggregate::merge(person_id, &[]));
        };

        let hits = self
            .role_hits::<FilmSummary>(&person.id, SUMMARY_FIELDS)
            .await?;
        Ok(PersonFilmAggregate::merge(person.id, &hits))
    }

    /// Full-text search on names; every match gets its own aggregate.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        text: &str,
        page: PageParams,
    ) -> Result<Vec<PersonDetails>, StoreError> {
        let request = query::full_text("full_name", text, page, PERSON_FIELDS);
        let documents = self.store.search(Collection::Persons, &request).await?;
        let matches: Vec<PersonRecord> = decode_all(Collection::Persons, documents)?;

        try_join_all(matches.into_iter().map(|person| self.decorate(person))).await
    }

    async fn decorate(&self, person: PersonRecord) -> Result<PersonDetails, StoreError> {
        let hits = self.role_hits::<FilmId>(&person.id, ID_FIELDS).await?;
        let aggregate = PersonAggregate::merge(person.id.clone(), &hits);
        Ok(PersonDetails { person, aggregate })
    }

    async fn role_hits<T: DeserializeOwned>(
        &self,
        person_id: &str,
        projection: &[&str],
    ) -> Result<Vec<RoleHits<T>>, StoreError> {
        let queries = Role::ALL.into_iter().map(move |role| async move {
            let request = query::nested_term(
                role.nested_path(),
                &role.id_field(),
                person_id,
                projection,
                self.role_query_limit,
            );
            let documents = self.store.search(Collection::Films, &request).await?;
            debug!(role = %role, hits = documents.len(), "role sub-query complete");
            let films = decode_all(Collection::Films, documents)?;
            Ok::<_, StoreError>(RoleHits::new(role, films))
        });

        try_join_all(queries).await
    }
}
