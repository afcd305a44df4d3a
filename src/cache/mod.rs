//! Edge cache subsystem.
//!
//! # Data Flow
//! ```text
//! Original request
//!     → gate.rs (method + exclusion patterns decide eligibility)
//!     → eligible: lookup(key) before any upstream call
//!     → after a 200 response: store(key, response) fire-and-forget
//! ```
//!
//! # Design Decisions
//! - The store is an injected capability behind a trait, so tests can
//!   substitute a fake and assert hit/miss behavior deterministically
//! - Keys derive from the original (pre-rewrite) request
//! - Expiry policy belongs to the store, not the pipeline

pub mod gate;
pub mod memory;

use async_trait::async_trait;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;

pub use gate::CacheGate;
pub use memory::MemoryStore;

/// A response held by the edge cache.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Failure of the cache capability. Lookup failures degrade to a miss and
/// store failures are logged and dropped; neither reaches the client.
#[derive(Debug, thiserror::Error)]
#[error("cache capability failed: {0}")]
pub struct CacheError(pub String);

/// Injected key-value capability holding cacheable responses.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Look up a stored response. `Ok(None)` is a miss.
    async fn lookup(&self, key: &str) -> Result<Option<CachedResponse>, CacheError>;

    /// Persist a response under the key.
    async fn store(&self, key: String, response: CachedResponse) -> Result<(), CacheError>;
}

/// Deterministic cache key for the original request.
///
/// Two requests producing the same key are interchangeable for cache
/// purposes.
pub fn cache_key(method: &Method, scheme: &str, host: &str, path_and_query: &str) -> String {
    format!("{} {}://{}{}", method, scheme, host, path_and_query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_deterministic() {
        let a = cache_key(&Method::GET, "https", "public.example", "/blog/x?y=1");
        let b = cache_key(&Method::GET, "https", "public.example", "/blog/x?y=1");
        assert_eq!(a, b);
        assert_eq!(a, "GET https://public.example/blog/x?y=1");
    }

    #[test]
    fn test_cache_key_distinguishes_method_and_query() {
        let get = cache_key(&Method::GET, "https", "h", "/p");
        let head = cache_key(&Method::HEAD, "https", "h", "/p");
        let query = cache_key(&Method::GET, "https", "h", "/p?a=1");
        assert_ne!(get, head);
        assert_ne!(get, query);
    }
}
