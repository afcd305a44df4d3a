//! In-process response store backed by a concurrent TTL cache.

use async_trait::async_trait;
use moka::future::Cache;

use crate::cache::{CacheError, CachedResponse, ResponseStore};

/// Moka-backed store. TTL and eviction are owned here, not by the
/// pipeline; an expired entry simply reads as a miss.
pub struct MemoryStore {
    store: Cache<String, CachedResponse>,
}

impl MemoryStore {
    pub fn new(max_capacity: u64, ttl_secs: u64) -> Self {
        Self {
            store: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(std::time::Duration::from_secs(ttl_secs))
                .build(),
        }
    }

    /// Number of entries currently held.
    pub fn entry_count(&self) -> u64 {
        self.store.entry_count()
    }
}

#[async_trait]
impl ResponseStore for MemoryStore {
    async fn lookup(&self, key: &str) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self.store.get(key).await)
    }

    async fn store(&self, key: String, response: CachedResponse) -> Result<(), CacheError> {
        self.store.insert(key, response).await;
        Ok(())
    }
}
