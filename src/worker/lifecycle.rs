// Install-time cache population and activate-time generation cleanup.

use std::sync::Arc;

use anyhow::Result;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::config::WorkerConfig;
use crate::platform::traits::{CacheStore, NetworkSource};

/// Fetch every manifest path and store ok responses under `cache_name`.
///
/// Each resource is an independent concurrent operation: a fetch or write
/// failure is logged and skipped, never aborting the siblings. Returns the
/// number of entries actually stored.
pub async fn populate_generation(
    store: &Arc<dyn CacheStore>,
    network: &Arc<dyn NetworkSource>,
    cache_name: &str,
    origin: &str,
    manifest: &[String],
) -> usize {
    let tasks = manifest.iter().map(|path| {
        let store = Arc::clone(store);
        let network = Arc::clone(network);
        let url = format!("{}{}", origin, path);
        let cache_name = cache_name.to_string();
        async move {
            match network.fetch(&url).await {
                Ok(resp) if resp.is_ok() => match store.put(&cache_name, &url, resp).await {
                    Ok(()) => {
                        debug!("precached {} into {}", url, cache_name);
                        true
                    }
                    Err(e) => {
                        warn!("precache write failed for {}: {}", url, e);
                        false
                    }
                },
                Ok(resp) => {
                    warn!("precache skipped {}: HTTP {}", url, resp.status);
                    false
                }
                Err(e) => {
                    warn!("precache fetch failed for {}: {}", url, e);
                    false
                }
            }
        }
    });

    join_all(tasks).await.into_iter().filter(|ok| *ok).count()
}

/// Delete every cache in this worker's namespace that is not one of the
/// current generations. Returns the deleted names.
pub async fn purge_stale_generations(
    store: &Arc<dyn CacheStore>,
    config: &WorkerConfig,
) -> Result<Vec<String>> {
    let prefix = config.cache_prefix();
    let current = config.current_generations();

    let stale: Vec<String> = store
        .list_caches()
        .await?
        .into_iter()
        .filter(|name| name.starts_with(&prefix) && !current.contains(name))
        .collect();

    let deletions = stale.iter().map(|name| {
        let store = Arc::clone(store);
        let name = name.clone();
        async move {
            match store.delete_cache(&name).await {
                Ok(_) => debug!("deleted stale generation {}", name),
                Err(e) => warn!("failed to delete stale generation {}: {}", name, e),
            }
        }
    });
    join_all(deletions).await;

    if !stale.is_empty() {
        info!("purged {} stale cache generation(s)", stale.len());
    }

    Ok(stale)
}
