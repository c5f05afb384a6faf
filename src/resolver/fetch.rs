//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the orchestrator and the network;
//! tests swap in a scripted implementation. The real [`HttpFetcher`] wraps
//! a shared [`reqwest::Client`] with timeouts and per-host identity
//! selection.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::identity::ClientIdentity;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// HTML bodies are truncated past this size; metadata lives in `<head>`.
const MAX_HTML_BYTES: usize = 2 * 1024 * 1024;

/// Fetches the HTML body of a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<String>;
}

/// HTTP fetcher backed by reqwest.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<String> {
        let identity = ClientIdentity::for_url(url);
        debug!(url = %url, identity = ?identity, "fetching page");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, identity.user_agent())
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status from {}", url))?;

        let mut body = response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {}", url))?;

        if body.len() > MAX_HTML_BYTES {
            let mut end = MAX_HTML_BYTES;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }

        Ok(body)
    }
}
