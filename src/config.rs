use serde::Deserialize;

/// File name of the engine script shipped next to each game's wasm module.
pub const RUNTIME_SCRIPT_NAME: &str = "love.js";

/// Extension of the engine's compiled module files.
pub const RUNTIME_MODULE_EXT: &str = "wasm";

/// Marker carried in every bundled game payload URL.
pub const GAME_PAYLOAD_MARKER: &str = "game.data";

/// Extensions served cache-first out of the shell generation.
pub const STATIC_ASSET_EXTS: &[&str] = &["css", "js", "png", "jpg", "svg"];

/// Top-level configuration for the offline cache coordinator.
///
/// Constructed once at worker startup and passed down; the three generation
/// names are derived from `namespace` and `version`, so bumping `version`
/// on deployment is the sole trigger for old-generation deletion on activate.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Stable token prefixed to every cache generation this worker owns.
    pub namespace: String,
    /// Deployment version embedded in all generation names.
    pub version: String,
    /// Origin the worker controls; manifest paths are resolved against it.
    pub origin: String,
    /// Cross-origin data backend host — traffic to it is never intercepted.
    pub backend_host: String,
    /// Shell resources pre-cached at install time.
    pub shell_manifest: Vec<String>,
    /// Runtime-binary resources pre-cached at install time.
    pub runtime_manifest: Vec<String>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            namespace: "gamehub".to_string(),
            version: "2.0.0".to_string(),
            origin: "http://localhost:8080".to_string(),
            backend_host: "supabase.co".to_string(),
            shell_manifest: vec![
                "/index.html".to_string(),
                "/manifest.json".to_string(),
                "/icons/icon-192.png".to_string(),
                "/icons/icon-512.png".to_string(),
            ],
            runtime_manifest: vec![
                "/snake/love.js".to_string(),
                "/snake/love.wasm".to_string(),
                "/escape-protocol/love.js".to_string(),
                "/escape-protocol/love.wasm".to_string(),
            ],
        }
    }
}

impl WorkerConfig {
    /// Name of the current shell cache generation.
    pub fn shell_cache(&self) -> String {
        format!("{}-v{}", self.namespace, self.version)
    }

    /// Name of the current runtime-binary cache generation.
    pub fn runtime_cache(&self) -> String {
        format!("{}-runtime-v{}", self.namespace, self.version)
    }

    /// Name of the current game-data cache generation.
    pub fn game_cache(&self) -> String {
        format!("{}-games-v{}", self.namespace, self.version)
    }

    /// Prefix distinguishing this worker's generations from unrelated caches
    /// sharing the same storage.
    pub fn cache_prefix(&self) -> String {
        format!("{}-", self.namespace)
    }

    /// The three generation names that are current for this config.
    pub fn current_generations(&self) -> [String; 3] {
        [self.shell_cache(), self.runtime_cache(), self.game_cache()]
    }
}
