use std::sync::Arc;

use tracing::instrument;

use crate::application::pagination::{PageParams, SortSpec};
use crate::application::query;
use crate::application::store::{Collection, DocumentStore, StoreError, decode, decode_all};
use crate::domain::entities::GenreRecord;

/// Fields accepted by the genre listing `sort` parameter.
pub const SORTABLE_FIELDS: &[&str] = &["id", "name"];

#[derive(Clone)]
pub struct GenreService {
    store: Arc<dyn DocumentStore>,
}

impl GenreService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, genre_id: &str) -> Result<Option<GenreRecord>, StoreError> {
        self.store
            .get(Collection::Genres, genre_id)
            .await?
            .map(|document| decode(Collection::Genres, document))
            .transpose()
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: PageParams,
        sort: SortSpec,
    ) -> Result<Vec<GenreRecord>, StoreError> {
        let request = query::listing(page, sort, None);
        let documents = self.store.search(Collection::Genres, &request).await?;
        decode_all(Collection::Genres, documents)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::application::pagination::SortDirection;
    use crate::infra::search::MemoryDocumentStore;

    fn service() -> GenreService {
        let store = MemoryDocumentStore::new();
        store.insert_all(
            Collection::Genres,
            ["Western", "Action", "Drama", "Comedy"]
                .iter()
                .enumerate()
                .map(|(index, name)| json!({ "id": format!("g{index}"), "name": name }))
                .collect(),
        );
        GenreService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn pages_concatenate_to_the_full_listing() {
        let service = service();
        let sort = SortSpec::new("name", SortDirection::Asc);

        let all = service
            .list(PageParams::new(1, 4).expect("valid page"), sort.clone())
            .await
            .expect("store ok");
        let names: Vec<_> = all.iter().map(|genre| genre.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Comedy", "Drama", "Western"]);

        let mut paged = Vec::new();
        for number in 1..=2 {
            let page = PageParams::new(number, 2).expect("valid page");
            paged.extend(service.list(page, sort.clone()).await.expect("store ok"));
        }
        assert_eq!(paged, all);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let service = service();
        let page = PageParams::new(5, 2).expect("valid page");
        let genres = service
            .list(page, SortSpec::new("id", SortDirection::Desc))
            .await
            .expect("store ok");
        assert!(genres.is_empty());
    }
}
