//! Read-through response cache.
//!
//! Every GET response body is cached under its raw request path and query
//! string in a pluggable [`CacheStore`] with a fixed time-to-live. Redirects,
//! non-200 responses and bodies that are not JSON are never stored, and a
//! failing store only ever degrades the cache to a pass-through.

mod config;
mod keys;
pub(crate) mod lock;
mod middleware;
mod redis_store;
mod response;
mod store;

pub use config::CacheConfig;
pub use keys::CacheKey;
pub use middleware::{CacheState, response_cache_layer};
pub use redis_store::RedisCacheStore;
pub use response::{BufferedResponse, buffer_response};
pub use store::{CacheError, CacheStore, MemoryCacheStore};
