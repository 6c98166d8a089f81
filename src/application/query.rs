//! Builders turning API parameters into store-native search requests.
//!
//! Pure data: nothing here performs I/O. `SearchRequest::body` renders the
//! Elasticsearch request body; the sort travels separately as the
//! `field:direction` query parameter.

use serde_json::{Map, Value, json};

use super::pagination::{PageParams, SortSpec};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    MatchAll,
    /// Relevance-ranked full-text match against one field.
    Match { field: String, text: String },
    /// Documents whose nested array at `path` holds an element with `field == value`.
    NestedTerm {
        path: String,
        field: String,
        value: String,
    },
}

impl Query {
    pub fn nested_term(
        path: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::NestedTerm {
            path: path.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Match { field, text } => {
                let mut clause = Map::new();
                clause.insert(field.clone(), Value::String(text.clone()));
                json!({ "match": clause })
            }
            Query::NestedTerm { path, field, value } => {
                let mut term = Map::new();
                term.insert(field.clone(), Value::String(value.clone()));
                json!({
                    "nested": {
                        "path": path,
                        "query": { "term": term },
                    }
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: Query,
    pub from: Option<u64>,
    pub size: Option<u32>,
    pub sort: Option<SortSpec>,
    /// Source fields to return; `None` returns whole documents.
    pub source: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            from: None,
            size: None,
            sort: None,
            source: None,
        }
    }

    pub fn paginate(mut self, page: PageParams) -> Self {
        self.from = Some(page.offset());
        self.size = Some(page.limit());
        self
    }

    pub fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn project(mut self, fields: &[&str]) -> Self {
        self.source = Some(fields.iter().map(|field| field.to_string()).collect());
        self
    }

    /// `field:direction` value for the store's `sort` query parameter.
    pub fn sort_param(&self) -> Option<String> {
        self.sort.as_ref().map(SortSpec::to_string)
    }

    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("query".to_string(), self.query.to_json());
        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if let Some(source) = &self.source {
            body.insert("_source".to_string(), json!(source));
        }
        Value::Object(body)
    }
}

/// Sorted, paginated listing, optionally restricted by a nested term.
pub fn listing(page: PageParams, sort: SortSpec, filter: Option<Query>) -> SearchRequest {
    SearchRequest::new(filter.unwrap_or(Query::MatchAll))
        .sorted(sort)
        .paginate(page)
}

/// Relevance-ranked match on `field`, projected and paginated.
pub fn full_text(field: &str, text: &str, page: PageParams, projection: &[&str]) -> SearchRequest {
    SearchRequest::new(Query::Match {
        field: field.to_string(),
        text: text.to_string(),
    })
    .project(projection)
    .paginate(page)
}

/// Nested term match used by person aggregation; `limit` caps the hit count.
pub fn nested_term(
    path: &str,
    term_field: &str,
    term_value: &str,
    projection: &[&str],
    limit: u32,
) -> SearchRequest {
    let mut request =
        SearchRequest::new(Query::nested_term(path, term_field, term_value)).project(projection);
    request.size = Some(limit);
    request
}
