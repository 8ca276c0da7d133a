// Axum boundary handler — the fetch-interception surface in front of the coordinator.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tracing::{debug, error};
use url::Url;

use crate::platform::traits::{WorkerRequest, WorkerResponse};
use crate::worker::coordinator::{FetchOutcome, OfflineCoordinator};

struct ServerState {
    coordinator: Arc<OfflineCoordinator>,
    passthrough: reqwest::Client,
}

pub struct PortalServer {
    port: u16,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl PortalServer {
    /// Start the boundary server on a random port, returning a handle.
    pub async fn start(coordinator: Arc<OfflineCoordinator>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let state = Arc::new(ServerState {
            coordinator,
            passthrough: reqwest::Client::new(),
        });
        let app = Router::new().fallback(intercept_handler).with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            port,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Build a URL for a path served through the boundary.
    pub fn url_for(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    /// Shutdown the server gracefully.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Catch-all — every request for the controlled origin lands here.
async fn intercept_handler(State(state): State<Arc<ServerState>>, req: Request) -> Response {
    let method = req.method().as_str().to_string();
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let target = format!(
        "{}{}",
        state.coordinator.config().origin,
        path_and_query
    );
    let url = match Url::parse(&target) {
        Ok(u) => u,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("bad request url: {}", e)).into_response();
        }
    };

    let worker_request = WorkerRequest {
        method: method.clone(),
        url,
    };

    match state.coordinator.handle(&worker_request).await {
        Ok(FetchOutcome::Served(response)) => to_http_response(response),
        Ok(FetchOutcome::PassThrough) => {
            debug!("{} {} passed through", method, path_and_query);
            forward(&state.passthrough, &method, &target, req).await
        }
        Err(e) => {
            error!("handle failed for {} {}: {}", method, path_and_query, e);
            (StatusCode::BAD_GATEWAY, format!("error: {}", e)).into_response()
        }
    }
}

fn to_http_response(response: WorkerResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut resp_headers = HeaderMap::new();
    if let Ok(value) = response.content_type.parse() {
        resp_headers.insert(header::CONTENT_TYPE, value);
    }

    (status, resp_headers, response.body).into_response()
}

/// Forward an unintercepted request to the origin verbatim.
async fn forward(client: &reqwest::Client, method: &str, target: &str, req: Request) -> Response {
    let method = match reqwest::Method::from_bytes(method.as_bytes()) {
        Ok(m) => m,
        Err(_) => return (StatusCode::METHOD_NOT_ALLOWED, "bad method").into_response(),
    };

    let body = match axum::body::to_bytes(req.into_body(), usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("body read failed: {}", e)).into_response();
        }
    };

    match client.request(method, target).body(body).send().await {
        Ok(upstream) => {
            let status = StatusCode::from_u16(upstream.status().as_u16())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut resp_headers = HeaderMap::new();
            if let Some(ct) = upstream.headers().get("content-type") {
                if let Ok(value) = ct.to_str().unwrap_or("").parse() {
                    resp_headers.insert(header::CONTENT_TYPE, value);
                }
            }
            match upstream.bytes().await {
                Ok(bytes) => (status, resp_headers, Body::from(bytes)).into_response(),
                Err(e) => {
                    (StatusCode::BAD_GATEWAY, format!("upstream read: {}", e)).into_response()
                }
            }
        }
        Err(e) => (StatusCode::BAD_GATEWAY, format!("upstream error: {}", e)).into_response(),
    }
}
