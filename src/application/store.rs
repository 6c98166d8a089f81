//! Document store capability consumed by the services.

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::query::SearchRequest;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Films,
    Genres,
    Persons,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Films => "films",
            Collection::Genres => "genres",
            Collection::Persons => "persons",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document store responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed document in `{collection}`: {message}")]
    Decode {
        collection: Collection,
        message: String,
    },
}

impl StoreError {
    pub fn unavailable(err: impl fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    pub fn decode(collection: Collection, err: impl fmt::Display) -> Self {
        Self::Decode {
            collection,
            message: err.to_string(),
        }
    }
}

/// Read access to a document store with point lookups and query search.
///
/// Documents are returned as their stored source; `search` yields them in
/// the order the store ranked or sorted them.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    async fn search(
        &self,
        collection: Collection,
        request: &SearchRequest,
    ) -> Result<Vec<Value>, StoreError>;
}

pub(crate) fn decode<T: DeserializeOwned>(
    collection: Collection,
    document: Value,
) -> Result<T, StoreError> {
    serde_json::from_value(document).map_err(|err| StoreError::decode(collection, err))
}

pub(crate) fn decode_all<T: DeserializeOwned>(
    collection: Collection,
    documents: Vec<Value>,
) -> Result<Vec<T>, StoreError> {
    documents
        .into_iter()
        .map(|document| decode(collection, document))
        .collect()
}
