// Offline cache coordinator — classifies each request and serves it through
// the strategy its category demands.

use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::lifecycle::{populate_generation, purge_stale_generations};
use super::stats::{StatsCollector, StatsSnapshot};
use crate::classify::{classify, RequestCategory};
use crate::config::WorkerConfig;
use crate::platform::traits::{CacheStore, NetworkSource, WorkerRequest, WorkerResponse};

/// Result of handling an intercepted request.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The coordinator produced a response.
    Served(WorkerResponse),
    /// The request is not intercepted; the boundary forwards it untouched.
    PassThrough,
}

pub struct OfflineCoordinator {
    config: WorkerConfig,
    store: Arc<dyn CacheStore>,
    network: Arc<dyn NetworkSource>,
    stats: Arc<StatsCollector>,
    shutdown_token: CancellationToken,
}

impl OfflineCoordinator {
    pub fn new(
        config: WorkerConfig,
        store: Arc<dyn CacheStore>,
        network: Arc<dyn NetworkSource>,
    ) -> Self {
        Self {
            config,
            store,
            network,
            stats: Arc::new(StatsCollector::new()),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Install: pre-populate the shell and runtime generations from their
    /// manifests. The two groups run concurrently and individual resource
    /// failures never abort the install.
    pub async fn install(&self) {
        let shell_cache = self.config.shell_cache();
        let runtime_cache = self.config.runtime_cache();
        let (shell_stored, runtime_stored) = tokio::join!(
            populate_generation(
                &self.store,
                &self.network,
                &shell_cache,
                &self.config.origin,
                &self.config.shell_manifest,
            ),
            populate_generation(
                &self.store,
                &self.network,
                &runtime_cache,
                &self.config.origin,
                &self.config.runtime_manifest,
            ),
        );
        info!(
            "install complete: shell {}/{} runtime {}/{}",
            shell_stored,
            self.config.shell_manifest.len(),
            runtime_stored,
            self.config.runtime_manifest.len()
        );
    }

    /// Activate: delete every namespace cache that is not a current
    /// generation. Returns the deleted names.
    pub async fn activate(&self) -> Result<Vec<String>> {
        purge_stale_generations(&self.store, &self.config).await
    }

    /// Handle one intercepted request, dispatching on its category.
    pub async fn handle(&self, request: &WorkerRequest) -> Result<FetchOutcome> {
        let category = classify(&request.method, &request.url, &self.config.backend_host);
        debug!("{} {} -> {:?}", request.method, request.url, category);

        let response = match category {
            RequestCategory::Excluded => {
                self.stats.record_passthrough();
                return Ok(FetchOutcome::PassThrough);
            }
            RequestCategory::RuntimeBinary => {
                self.cache_first(&self.config.runtime_cache(), request).await?
            }
            RequestCategory::StaticAsset => {
                self.cache_first(&self.config.shell_cache(), request).await?
            }
            RequestCategory::GamePayload => self.stale_while_revalidate(request).await?,
            RequestCategory::Document => self.network_first(request).await?,
            RequestCategory::Other => self.network_with_cache_fallback(request).await?,
        };

        Ok(FetchOutcome::Served(response))
    }

    /// Abandon background revalidation work. In-flight cache writes are
    /// atomic per key, so no cleanup is required.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Serve from `cache` if present; otherwise fetch, store the response if
    /// it is ok, and return it.
    async fn cache_first(&self, cache: &str, request: &WorkerRequest) -> Result<WorkerResponse> {
        let url = request.url.as_str();

        if let Some(hit) = self.store.lookup(cache, url).await? {
            self.stats.record_hit();
            return Ok(hit);
        }
        self.stats.record_miss();

        let response = self.fetch_counted(url).await?;
        if response.is_ok() {
            self.write_back(cache, url, response.clone()).await;
        }
        Ok(response)
    }

    /// Serve a cached game payload immediately and refresh it in the
    /// background; on a cache miss, wait for the network instead.
    async fn stale_while_revalidate(&self, request: &WorkerRequest) -> Result<WorkerResponse> {
        let cache = self.config.game_cache();
        let url = request.url.as_str();

        match self.store.lookup(&cache, url).await? {
            Some(stale) => {
                self.stats.record_hit();
                self.spawn_revalidation(cache, url.to_string());
                Ok(stale)
            }
            None => {
                self.stats.record_miss();
                let response = self.fetch_counted(url).await?;
                if response.is_ok() {
                    self.write_back(&cache, url, response.clone()).await;
                }
                Ok(response)
            }
        }
    }

    /// Fetch from the network; store ok responses in the shell generation.
    /// On transport failure, fall back to the shell generation's copy.
    async fn network_first(&self, request: &WorkerRequest) -> Result<WorkerResponse> {
        let cache = self.config.shell_cache();
        let url = request.url.as_str();

        match self.fetch_counted(url).await {
            Ok(response) => {
                if response.is_ok() {
                    self.write_back(&cache, url, response.clone()).await;
                }
                Ok(response)
            }
            Err(err) => {
                warn!("network-first fetch failed for {}: {}", url, err);
                match self.store.lookup(&cache, url).await? {
                    Some(hit) => {
                        self.stats.record_hit();
                        Ok(hit)
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// Network-only; never caches. On transport failure, fall back to any
    /// matching entry in the current generations.
    async fn network_with_cache_fallback(
        &self,
        request: &WorkerRequest,
    ) -> Result<WorkerResponse> {
        let url = request.url.as_str();

        match self.fetch_counted(url).await {
            Ok(response) => Ok(response),
            Err(err) => {
                warn!("fetch failed for {}: {}; searching caches", url, err);
                for cache in self.config.current_generations() {
                    if let Some(hit) = self.store.lookup(&cache, url).await? {
                        self.stats.record_hit();
                        return Ok(hit);
                    }
                }
                Err(err)
            }
        }
    }

    /// Detached refresh for stale-while-revalidate. The caller never joins
    /// it; failures are logged here and nowhere else.
    fn spawn_revalidation(&self, cache: String, url: String) {
        let store = Arc::clone(&self.store);
        let network = Arc::clone(&self.network);
        let stats = Arc::clone(&self.stats);
        let shutdown = self.shutdown_token.clone();

        tokio::spawn(async move {
            let refresh = async {
                match network.fetch(&url).await {
                    Ok(resp) if resp.is_ok() => {
                        stats.record_network_fetch();
                        match store.put(&cache, &url, resp).await {
                            Ok(()) => {
                                stats.record_revalidation();
                                debug!("revalidated {}", url);
                            }
                            Err(e) => warn!("revalidation write failed for {}: {}", url, e),
                        }
                    }
                    Ok(resp) => {
                        stats.record_network_fetch();
                        debug!("revalidation of {} returned HTTP {}", url, resp.status);
                    }
                    Err(e) => {
                        stats.record_network_failure();
                        warn!("revalidation fetch failed for {}: {}", url, e);
                    }
                }
            };

            tokio::select! {
                _ = refresh => {}
                _ = shutdown.cancelled() => {
                    debug!("revalidation of {} abandoned at shutdown", url);
                }
            }
        });
    }

    async fn fetch_counted(&self, url: &str) -> Result<WorkerResponse> {
        match self.network.fetch(url).await {
            Ok(resp) => {
                self.stats.record_network_fetch();
                Ok(resp)
            }
            Err(e) => {
                self.stats.record_network_failure();
                Err(e)
            }
        }
    }

    /// Cache writes are best-effort: a storage failure is logged, never
    /// surfaced to the request that triggered it.
    async fn write_back(&self, cache: &str, url: &str, response: WorkerResponse) {
        if let Err(e) = self.store.put(cache, url, response).await {
            warn!("cache write failed for {} in {}: {}", url, cache, e);
        }
    }
}
