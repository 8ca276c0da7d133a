use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{CacheStore, WorkerResponse};

/// In-process cache storage — a map of cache name to URL-keyed entries.
///
/// Writes are atomic per key under the lock, matching the last-write-wins
/// contract for concurrent writes to the same URL.
#[derive(Default)]
pub struct MemoryCacheStore {
    caches: RwLock<HashMap<String, HashMap<String, WorkerResponse>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in a cache. Missing caches count as empty.
    pub fn entry_count(&self, cache: &str) -> usize {
        self.caches
            .read()
            .get(cache)
            .map(HashMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn list_caches(&self) -> Result<Vec<String>> {
        Ok(self.caches.read().keys().cloned().collect())
    }

    async fn delete_cache(&self, name: &str) -> Result<bool> {
        Ok(self.caches.write().remove(name).is_some())
    }

    async fn put(&self, cache: &str, url: &str, response: WorkerResponse) -> Result<()> {
        self.caches
            .write()
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), response);
        Ok(())
    }

    async fn lookup(&self, cache: &str, url: &str) -> Result<Option<WorkerResponse>> {
        Ok(self
            .caches
            .read()
            .get(cache)
            .and_then(|entries| entries.get(url))
            .cloned())
    }
}
