//! Document store adapters.
//!
//! [`ElasticDocumentStore`] talks to an Elasticsearch-compatible REST API;
//! [`MemoryDocumentStore`] evaluates the same requests in process.

mod memory;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::application::query::SearchRequest;
use crate::application::store::{Collection, DocumentStore, StoreError};

pub use memory::{MemoryDocumentStore, SeedData};

/// Index backing each collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    pub films: String,
    pub genres: String,
    pub persons: String,
}

impl IndexNames {
    pub fn index(&self, collection: Collection) -> &str {
        match collection {
            Collection::Films => &self.films,
            Collection::Genres => &self.genres,
            Collection::Persons => &self.persons,
        }
    }
}

impl Default for IndexNames {
    fn default() -> Self {
        Self {
            films: "movies".to_string(),
            genres: "genres".to_string(),
            persons: "persons".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ElasticDocumentStore {
    client: Client,
    base: Url,
    indices: IndexNames,
}

impl ElasticDocumentStore {
    pub fn new(base: Url, indices: IndexNames, timeout: Duration) -> Result<Self, StoreError> {
        if base.cannot_be_a_base() {
            return Err(StoreError::unavailable(format!(
                "search url `{base}` cannot carry a path"
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(StoreError::unavailable)?;
        Ok(Self {
            client,
            base,
            indices,
        })
    }

    fn endpoint(&self, collection: Collection, tail: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(self.indices.index(collection))
                .extend(tail);
        }
        url
    }

    fn search_url(&self, collection: Collection, request: &SearchRequest) -> Url {
        let mut url = self.endpoint(collection, &["_search"]);
        if let Some(sort) = request.sort_param() {
            url.query_pairs_mut().append_pair("sort", &sort);
        }
        url
    }
}

#[derive(Deserialize)]
struct GetResponse {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: SearchHits,
}

#[derive(Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "_source", default)]
    source: Option<Value>,
}

fn document_from(collection: Collection, body: Value) -> Result<Option<Value>, StoreError> {
    let response: GetResponse =
        serde_json::from_value(body).map_err(|err| StoreError::decode(collection, err))?;
    if !response.found {
        return Ok(None);
    }
    response
        .source
        .map(Some)
        .ok_or_else(|| StoreError::decode(collection, "document found without `_source`"))
}

/// Hit sources in ranked order; a hit without `_source` becomes `{}`.
fn hits_from(collection: Collection, body: Value) -> Result<Vec<Value>, StoreError> {
    let response: SearchResponse =
        serde_json::from_value(body).map_err(|err| StoreError::decode(collection, err))?;
    Ok(response
        .hits
        .hits
        .into_iter()
        .map(|hit| hit.source.unwrap_or_else(|| Value::Object(Default::default())))
        .collect())
}

async fn read_body(
    collection: Collection,
    response: reqwest::Response,
) -> Result<Value, StoreError> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Status {
            status: status.as_u16(),
            message,
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|err| StoreError::decode(collection, err))
}

#[async_trait]
impl DocumentStore for ElasticDocumentStore {
    #[instrument(skip(self), fields(index = self.indices.index(collection)))]
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let url = self.endpoint(collection, &["_doc", id]);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(StoreError::unavailable)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("document not found");
            return Ok(None);
        }
        let body = read_body(collection, response).await?;
        document_from(collection, body)
    }

    #[instrument(skip_all, fields(index = self.indices.index(collection)))]
    async fn search(
        &self,
        collection: Collection,
        request: &SearchRequest,
    ) -> Result<Vec<Value>, StoreError> {
        let url = self.search_url(collection, request);
        let response = self
            .client
            .post(url)
            .json(&request.body())
            .send()
            .await
            .map_err(StoreError::unavailable)?;

        let body = read_body(collection, response).await?;
        let hits = hits_from(collection, body)?;
        debug!(hits = hits.len(), "search complete");
        Ok(hits)
    }
}
