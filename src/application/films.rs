use std::sync::Arc;

use tracing::instrument;

use crate::application::pagination::{PageParams, SortSpec};
use crate::application::query::{self, Query};
use crate::application::store::{Collection, DocumentStore, StoreError, decode, decode_all};
use crate::domain::entities::{FilmRecord, FilmSummary};

/// Fields accepted by the film listing `sort` parameter.
pub const SORTABLE_FIELDS: &[&str] = &["imdb_rating", "id"];

const SUMMARY_FIELDS: &[&str] = &["id", "title", "imdb_rating"];

#[derive(Clone)]
pub struct FilmService {
    store: Arc<dyn DocumentStore>,
}

impl FilmService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, film_id: &str) -> Result<Option<FilmRecord>, StoreError> {
        self.store
            .get(Collection::Films, film_id)
            .await?
            .map(|document| decode(Collection::Films, document))
            .transpose()
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: PageParams,
        sort: SortSpec,
        genre_id: Option<&str>,
    ) -> Result<Vec<FilmSummary>, StoreError> {
        let filter = genre_id.map(|id| Query::nested_term("genres", "genres.id", id));
        let request = query::listing(page, sort, filter).project(SUMMARY_FIELDS);
        let documents = self.store.search(Collection::Films, &request).await?;
        decode_all(Collection::Films, documents)
    }

    #[instrument(skip(self))]
    pub async fn search(&self, text: &str, page: PageParams) -> Result<Vec<FilmSummary>, StoreError> {
        let request = query::full_text("title", text, page, SUMMARY_FIELDS);
        let documents = self.store.search(Collection::Films, &request).await?;
        decode_all(Collection::Films, documents)
    }
}
