use std::fmt;

use axum::http::Uri;

/// Cache key: raw path immediately followed by the raw query string.
///
/// Nothing is decoded or reordered, so `?a=1&b=2` and `?b=2&a=1` are
/// different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_parts(path: &str, query: Option<&str>) -> Self {
        let query = query.unwrap_or_default();
        let mut key = String::with_capacity(path.len() + query.len());
        key.push_str(path);
        key.push_str(query);
        Self(key)
    }

    pub fn from_uri(uri: &Uri) -> Self {
        Self::from_parts(uri.path(), uri.query())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
