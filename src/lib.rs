// Offline cache coordinator for the GameHub portal — request classification,
// per-category caching strategies, and versioned cache generations.

use std::sync::Once;

use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod classify;
pub mod config;
pub mod platform;
pub mod server;
pub mod worker;

static INIT_TRACING: Once = Once::new();

/// Initialize tracing once for embedders that don't install their own subscriber.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init();

        info!("offline cache tracing initialized");
    });
}
