// Integration test for the boundary server — online serving, passthrough,
// and offline fallback after the origin goes away.

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::Request,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;

use gamehub_offline_cache::config::WorkerConfig;
use gamehub_offline_cache::platform::http_network::HttpNetwork;
use gamehub_offline_cache::platform::memory_store::MemoryCacheStore;
use gamehub_offline_cache::server::handler::PortalServer;
use gamehub_offline_cache::worker::coordinator::OfflineCoordinator;

/// Fake portal origin serving the shell, runtime binaries, and an echo API.
async fn upstream_handler(req: Request) -> Response {
    let path = req.uri().path().to_string();

    if req.method().as_str() == "POST" && path == "/api/echo" {
        let body = to_bytes(req.into_body(), usize::MAX).await.unwrap();
        return (StatusCode::OK, body).into_response();
    }

    let (content_type, body): (&str, &[u8]) = match path.as_str() {
        "/index.html" => ("text/html", b"<html>portal</html>"),
        "/manifest.json" => ("application/json", b"{\"name\":\"gamehub\"}"),
        "/icons/icon-192.png" => ("image/png", b"png-192"),
        "/icons/icon-512.png" => ("image/png", b"png-512"),
        "/style.css" => ("text/css", b"body{margin:0}"),
        "/snake/love.js" => ("text/javascript", b"snake-script"),
        "/snake/love.wasm" => ("application/wasm", b"snake-module"),
        "/escape-protocol/love.js" => ("text/javascript", b"escape-script"),
        "/escape-protocol/love.wasm" => ("application/wasm", b"escape-module"),
        _ => return (StatusCode::NOT_FOUND, "not found").into_response(),
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type.to_string())],
        body.to_vec(),
    )
        .into_response()
}

async fn start_upstream() -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new().fallback(upstream_handler);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn test_portal_serves_online_and_offline() {
    gamehub_offline_cache::init_tracing();

    // 1. Start the fake origin and point the worker config at it.
    let (origin, upstream_handle) = start_upstream().await;
    let config = WorkerConfig {
        origin: origin.clone(),
        ..WorkerConfig::default()
    };

    let coordinator = Arc::new(OfflineCoordinator::new(
        config,
        Arc::new(MemoryCacheStore::new()),
        Arc::new(HttpNetwork::new()),
    ));

    // 2. Install pre-populates shell + runtime; activate finds nothing stale.
    coordinator.install().await;
    assert!(coordinator.activate().await.unwrap().is_empty());

    let server = PortalServer::start(coordinator.clone()).await.unwrap();
    let client = reqwest::Client::new();

    // 3. Online: documents come from the network.
    let resp = client.get(server.url_for("/index.html")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"<html>portal</html>");

    // 4. Non-GET requests pass through to the origin untouched.
    let resp = client
        .post(server.url_for("/api/echo"))
        .body("ping")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"ping");

    // 5. Fetch a static asset once while online so it lands in the shell cache.
    let resp = client.get(server.url_for("/style.css")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    // 6. Kill the origin. Everything cached must keep working.
    upstream_handle.abort();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let resp = client.get(server.url_for("/index.html")).send().await.unwrap();
    assert_eq!(resp.status(), 200, "document must fall back to the shell cache");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"<html>portal</html>");

    let resp = client.get(server.url_for("/style.css")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"body{margin:0}");

    let resp = client
        .get(server.url_for("/snake/love.wasm"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200, "runtime binaries were precached at install");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"snake-module");

    // 7. Uncached offline requests surface the failure as a gateway error.
    let resp = client.get(server.url_for("/api/games")).send().await.unwrap();
    assert_eq!(resp.status(), 502);

    let snap = coordinator.stats();
    assert!(snap.cache_hits >= 3);
    assert!(snap.network_failures >= 1);

    coordinator.shutdown();
    server.shutdown();
}
