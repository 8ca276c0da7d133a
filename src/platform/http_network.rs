use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::traits::{NetworkSource, WorkerResponse};

/// Network source backed by a shared reqwest client.
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkSource for HttpNetwork {
    async fn fetch(&self, url: &str) -> Result<WorkerResponse> {
        // Transport errors propagate; non-ok statuses are a valid response
        // and the strategy layer decides what to do with them.
        let resp = self.client.get(url).send().await?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let body = resp.bytes().await?;

        debug!("network fetch {} status={} bytes={}", url, status, body.len());

        Ok(WorkerResponse {
            status,
            content_type,
            body,
        })
    }
}
