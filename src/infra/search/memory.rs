//! In-process document store evaluating [`SearchRequest`]s the way the search
//! backend does, for tests and local runs without a search cluster.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::application::pagination::SortDirection;
use crate::application::query::{Query, SearchRequest};
use crate::application::store::{Collection, DocumentStore, StoreError};
use crate::cache::lock::{read_or_recover, write_or_recover};

const SOURCE: &str = "infra::search::memory";

/// Hits returned when a request carries no explicit size.
const DEFAULT_SIZE: usize = 10;

/// Documents to preload, one array per collection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub films: Vec<Value>,
    pub genres: Vec<Value>,
    pub persons: Vec<Value>,
}

#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: SeedData) -> Self {
        let store = Self::new();
        store.insert_all(Collection::Films, seed.films);
        store.insert_all(Collection::Genres, seed.genres);
        store.insert_all(Collection::Persons, seed.persons);
        store
    }

    pub fn insert(&self, collection: Collection, document: Value) {
        self.insert_all(collection, vec![document]);
    }

    /// Append documents; later documents rank after earlier ones on ties.
    pub fn insert_all(&self, collection: Collection, documents: Vec<Value>) {
        write_or_recover(&self.collections, SOURCE, "insert")
            .entry(collection)
            .or_default()
            .extend(documents);
    }

    fn evaluate(&self, collection: Collection, request: &SearchRequest) -> Vec<Value> {
        let collections = read_or_recover(&self.collections, SOURCE, "search");
        let documents = collections.get(&collection).map(Vec::as_slice).unwrap_or_default();

        let mut scored: Vec<(usize, &Value)> = documents
            .iter()
            .filter_map(|document| score(&request.query, document).map(|score| (score, document)))
            .collect();

        match &request.sort {
            Some(sort) => scored.sort_by(|(_, left), (_, right)| {
                compare_field(left.get(&sort.field), right.get(&sort.field), sort.direction)
            }),
            None if matches!(request.query, Query::Match { .. }) => {
                scored.sort_by(|(left, _), (right, _)| right.cmp(left));
            }
            None => {}
        }

        let from = usize::try_from(request.from.unwrap_or(0)).unwrap_or(usize::MAX);
        let size = request
            .size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_SIZE);

        scored
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(_, document)| project(document, request.source.as_deref()))
            .collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let collections = read_or_recover(&self.collections, SOURCE, "get");
        Ok(collections.get(&collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| document.get("id").and_then(Value::as_str) == Some(id))
                .cloned()
        }))
    }

    async fn search(
        &self,
        collection: Collection,
        request: &SearchRequest,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self.evaluate(collection, request))
    }
}

/// `None` when the document does not match; otherwise its relevance.
fn score(query: &Query, document: &Value) -> Option<usize> {
    match query {
        Query::MatchAll => Some(0),
        Query::Match { field, text } => {
            let haystack: BTreeSet<String> = document
                .get(field)
                .and_then(Value::as_str)
                .map(tokens)
                .unwrap_or_default();
            let matched = tokens(text)
                .iter()
                .filter(|token| haystack.contains(*token))
                .count();
            (matched > 0).then_some(matched)
        }
        Query::NestedTerm { path, field, value } => {
            let inner = field
                .strip_prefix(path.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(field);
            let found = document
                .get(path)
                .and_then(Value::as_array)
                .is_some_and(|elements| {
                    elements
                        .iter()
                        .any(|element| element.get(inner).and_then(Value::as_str) == Some(value))
                });
            found.then_some(0)
        }
    }
}

fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Missing values sort last in either direction.
fn compare_field(left: Option<&Value>, right: Option<&Value>, direction: SortDirection) -> Ordering {
    let left = left.filter(|value| !value.is_null());
    let right = right.filter(|value| !value.is_null());
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(left), Some(right)) => {
            let ordering = compare_values(left, right);
            match direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        }
    }
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => left
            .as_f64()
            .partial_cmp(&right.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(left), Value::String(right)) => left.cmp(right),
        _ => left.to_string().cmp(&right.to_string()),
    }
}

fn project(document: &Value, fields: Option<&[String]>) -> Value {
    let (Some(fields), Some(object)) = (fields, document.as_object()) else {
        return document.clone();
    };
    let projected: Map<String, Value> = fields
        .iter()
        .filter_map(|field| object.get(field).map(|value| (field.clone(), value.clone())))
        .collect();
    Value::Object(projected)
}
