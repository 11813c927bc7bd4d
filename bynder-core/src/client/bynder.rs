use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use config::{Credentials, Settings};
use reqwest::{Method, StatusCode, header};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{Level, event, instrument, warn};
use url::Url;

use super::RemoteAssetClient;
use super::oauth::OAuthSigner;
use crate::error::{BynderError, Result};
use crate::ids::AssetIdentifier;
use crate::metadata::{AssetMetadata, UserInfo};
use crate::traffic_log;

/// Integration id registered with Bynder for usage tracking
pub const INTEGRATION_ID: &str = "8517905e-6c2f-47c3-96ca-0312027bbc95";

/// OAuth 1.0a authenticated client for the Bynder v4 API
#[derive(Clone)]
pub struct BynderClient {
    http: reqwest::Client,
    base_url: Url,
    signer: OAuthSigner,
}

impl BynderClient {
    pub fn new(base_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BynderError::RemoteUnavailable(format!("Invalid API URL {}: {}", base_url, e)))?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            signer: OAuthSigner::new(credentials),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.api_base_url(),
            settings.credentials()?,
            Duration::from_secs(settings.request_timeout_secs()),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BynderError::RemoteUnavailable(format!("Invalid endpoint {}: {}", path, e)))
    }

    async fn send(&self, method: Method, url: Url, form: &[(&str, &str)]) -> Result<reqwest::Response> {
        let authorization = self.signer.authorization_header(method.as_str(), &url, form)?;
        traffic_log::log_request(method.as_str(), url.path());

        let mut request = self
            .http
            .request(method, url)
            .header(header::AUTHORIZATION, authorization)
            .header(header::ACCEPT, "application/json");
        if !form.is_empty() {
            request = request.form(form);
        }

        request.send().await.map_err(|e| {
            traffic_log::log_error(&e.to_string());
            BynderError::from(e)
        })
    }

    #[instrument(level = "info", skip(self))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        let response = self.send(Method::GET, url, &[]).await?;
        let status = response.status();
        let text = response.text().await?;
        traffic_log::log_response(status.as_u16(), &text);

        if !status.is_success() {
            return Err(BynderError::RemoteUnavailable(format!(
                "Request to {} failed with status: {}",
                path, status
            )));
        }
        event!(Level::DEBUG, response = text);

        serde_json::from_str::<T>(&text)
            .map_err(|e| BynderError::RemoteUnavailable(format!("Invalid response from {}: {}", path, e)))
    }
}

#[async_trait]
impl RemoteAssetClient for BynderClient {
    async fn fetch_metadata(&self, id: &AssetIdentifier) -> Result<AssetMetadata> {
        // A literal JSON `null` body means "no data", not a failure
        let metadata: Option<AssetMetadata> = self.get_json(&format!("api/v4/media/{}/", id)).await?;
        Ok(metadata.unwrap_or_default())
    }

    #[instrument(level = "info", skip(self))]
    async fn record_usage(
        &self,
        id: &AssetIdentifier,
        uri: &str,
        note: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> bool {
        let timestamp = timestamp
            .unwrap_or_else(Utc::now)
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let form = [
            ("integration_id", INTEGRATION_ID),
            ("asset_id", id.as_str()),
            ("uri", uri),
            ("additional", note.unwrap_or_default()),
            ("timestamp", timestamp.as_str()),
        ];

        let result = match self.endpoint("api/media/usage/") {
            Ok(url) => self.send(Method::POST, url, &form).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Recording usage of {} failed with status {}", id, response.status());
                false
            }
            Err(e) => {
                warn!("Recording usage of {} failed: {}", id, e);
                false
            }
        }
    }

    #[instrument(level = "info", skip(self))]
    async fn clear_usage(&self, id: &AssetIdentifier, uri: &str) -> bool {
        let url = match self.endpoint("api/media/usage/") {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("integration_id", INTEGRATION_ID)
                    .append_pair("asset_id", id.as_str())
                    .append_pair("uri", uri);
                url
            }
            Err(e) => {
                warn!("Clearing usage of {} failed: {}", id, e);
                return false;
            }
        };

        match self.send(Method::DELETE, url, &[]).await {
            Ok(response) => {
                if response.status() != StatusCode::NO_CONTENT {
                    warn!("Clearing usage of {} returned status {}", id, response.status());
                }
                response.status() == StatusCode::NO_CONTENT
            }
            Err(e) => {
                warn!("Clearing usage of {} failed: {}", id, e);
                false
            }
        }
    }

    async fn current_user(&self) -> Result<UserInfo> {
        self.get_json("api/v4/currentUser/").await
    }
}
