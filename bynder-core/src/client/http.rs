use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::error::{BynderError, Result};

/// Unauthenticated access to CDN-hosted derivative and stream URLs
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Content type reported by a HEAD request, `None` when the server sends none
    async fn probe_content_type(&self, url: &str) -> Result<Option<String>>;

    async fn download(&self, url: &str) -> Result<Bytes>;
}

#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn probe_content_type(&self, url: &str) -> Result<Option<String>> {
        let response = self.client.head(url).send().await?;
        if !response.status().is_success() {
            return Err(BynderError::RemoteUnavailable(format!(
                "HEAD {} failed with status: {}",
                url,
                response.status()
            )));
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        debug!(?content_type, "Probed stream");
        Ok(content_type)
    }

    #[instrument(level = "info", skip(self))]
    async fn download(&self, url: &str) -> Result<Bytes> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(BynderError::RemoteUnavailable(format!(
                "GET {} failed with status: {}",
                url,
                response.status()
            )));
        }
        Ok(response.bytes().await?)
    }
}
