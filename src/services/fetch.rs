// src/services/fetch.rs

//! Page fetch capability.
//!
//! The crawler depends on this trait rather than on `reqwest`
//! directly, so tests can inject an in-memory fetcher.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;

/// Capability to fetch raw markup for an absolute URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher backed by a configured `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured user-agent and timeout.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;
        let response = response
            .error_for_status()
            .map_err(|e| classify(url, e))?;
        response.text().await.map_err(|e| classify(url, e))
    }
}

/// Map a transport error into the fetch taxonomy, keeping timeout and
/// HTTP-status failures distinguishable in the message.
fn classify(url: &str, error: reqwest::Error) -> AppError {
    let message = if error.is_timeout() {
        format!("timed out: {error}")
    } else if let Some(status) = error.status() {
        format!("status {status}")
    } else {
        format!("transport: {error}")
    };
    AppError::fetch(url, message)
}
