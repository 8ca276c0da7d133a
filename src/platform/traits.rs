use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// An intercepted request, reduced to what the coordinator observes.
#[derive(Debug, Clone)]
pub struct WorkerRequest {
    pub method: String,
    pub url: Url,
}

impl WorkerRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
        }
    }
}

/// A response body plus the headers the coordinator preserves.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

impl WorkerResponse {
    pub fn ok(content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status: 200,
            content_type: content_type.into(),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range. Only ok responses are cached.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Named-cache storage. Writing to a cache creates it implicitly; deleting a
/// cache drops all of its entries atomically. Entries are keyed by URL.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Names of all caches currently present in storage.
    async fn list_caches(&self) -> Result<Vec<String>>;

    /// Delete a whole cache. Returns `true` if it existed.
    async fn delete_cache(&self, name: &str) -> Result<bool>;

    /// Store a response under `url`, replacing any prior entry.
    async fn put(&self, cache: &str, url: &str, response: WorkerResponse) -> Result<()>;

    /// Look up the entry for `url`, if any.
    async fn lookup(&self, cache: &str, url: &str) -> Result<Option<WorkerResponse>>;
}

/// Network boundary. `fetch` resolves to the server's response whatever its
/// status; it fails only on transport errors (offline, DNS, reset).
#[async_trait]
pub trait NetworkSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<WorkerResponse>;
}
