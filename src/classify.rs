use url::Url;

use crate::config::{
    GAME_PAYLOAD_MARKER, RUNTIME_MODULE_EXT, RUNTIME_SCRIPT_NAME, STATIC_ASSET_EXTS,
};

/// Resource category a request resolves to. Every request maps to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCategory {
    /// Non-GET or data-backend traffic — never intercepted.
    Excluded,
    /// Engine bytecode/native-module files (love.js / *.wasm).
    RuntimeBinary,
    /// Bundled game asset/data file loaded after the runtime starts.
    GamePayload,
    /// HTML documents.
    Document,
    /// Style sheets, scripts, and common image formats.
    StaticAsset,
    /// Anything else on the controlled origin.
    Other,
}

/// Classify a request by method and URL. First match wins:
/// non-GET, backend host, runtime binary, game payload, document,
/// static asset, other.
pub fn classify(method: &str, url: &Url, backend_host: &str) -> RequestCategory {
    if !method.eq_ignore_ascii_case("GET") {
        return RequestCategory::Excluded;
    }

    // Never cache authentication or data-API traffic; subdomains of the
    // backend host (e.g. project refs) count as the backend too.
    if let Some(host) = url.host_str() {
        if host == backend_host || host.ends_with(&format!(".{}", backend_host)) {
            return RequestCategory::Excluded;
        }
    }

    let path = url.path();

    if is_runtime_binary(path) {
        return RequestCategory::RuntimeBinary;
    }

    if path.contains(GAME_PAYLOAD_MARKER) {
        return RequestCategory::GamePayload;
    }

    if path.ends_with(".html") {
        return RequestCategory::Document;
    }

    if let Some(ext) = extension(path) {
        if STATIC_ASSET_EXTS.contains(&ext) {
            return RequestCategory::StaticAsset;
        }
    }

    RequestCategory::Other
}

fn is_runtime_binary(path: &str) -> bool {
    if extension(path) == Some(RUNTIME_MODULE_EXT) {
        return true;
    }
    // The engine script shares the .js extension with ordinary static assets,
    // so it is matched by file name before the static-asset rule runs.
    path.rsplit('/').next() == Some(RUNTIME_SCRIPT_NAME)
}

fn extension(path: &str) -> Option<&str> {
    let file = path.rsplit('/').next()?;
    match file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => Some(ext),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACKEND: &str = "supabase.co";

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_non_get_is_excluded() {
        let u = url("http://localhost/snake/love.wasm");
        assert_eq!(classify("POST", &u, BACKEND), RequestCategory::Excluded);
        assert_eq!(classify("PUT", &u, BACKEND), RequestCategory::Excluded);
    }

    #[test]
    fn test_backend_host_is_excluded() {
        let u = url("https://abcdef.supabase.co/rest/v1/sessions");
        assert_eq!(classify("GET", &u, BACKEND), RequestCategory::Excluded);
        let bare = url("https://supabase.co/auth/token.html");
        assert_eq!(classify("GET", &bare, BACKEND), RequestCategory::Excluded);
    }

    #[test]
    fn test_runtime_binary_beats_static_asset() {
        assert_eq!(
            classify("GET", &url("http://localhost/snake/love.wasm"), BACKEND),
            RequestCategory::RuntimeBinary
        );
        // love.js ends in .js but is the engine script, not a static asset.
        assert_eq!(
            classify("GET", &url("http://localhost/snake/love.js"), BACKEND),
            RequestCategory::RuntimeBinary
        );
        assert_eq!(
            classify("GET", &url("http://localhost/app.js"), BACKEND),
            RequestCategory::StaticAsset
        );
    }

    #[test]
    fn test_game_payload_marker() {
        assert_eq!(
            classify("GET", &url("http://localhost/snake/game.data"), BACKEND),
            RequestCategory::GamePayload
        );
    }

    #[test]
    fn test_document_and_static_assets() {
        assert_eq!(
            classify("GET", &url("http://localhost/index.html"), BACKEND),
            RequestCategory::Document
        );
        for path in ["/style.css", "/icons/icon-192.png", "/logo.svg", "/bg.jpg"] {
            let u = url(&format!("http://localhost{}", path));
            assert_eq!(classify("GET", &u, BACKEND), RequestCategory::StaticAsset);
        }
    }

    #[test]
    fn test_other_catches_the_rest() {
        assert_eq!(
            classify("GET", &url("http://localhost/api/games"), BACKEND),
            RequestCategory::Other
        );
        assert_eq!(
            classify("GET", &url("http://localhost/font.woff2"), BACKEND),
            RequestCategory::Other
        );
    }

    #[test]
    fn test_classification_is_stable() {
        let u = url("http://localhost/snake/game.data");
        let first = classify("GET", &u, BACKEND);
        for _ in 0..10 {
            assert_eq!(classify("GET", &u, BACKEND), first);
        }
    }
}
