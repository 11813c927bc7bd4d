//! Remote access: the Bynder API client and plain HTTP content fetching

mod bynder;
mod http;
pub mod oauth;

pub use bynder::{BynderClient, INTEGRATION_ID};
pub use http::{ContentFetcher, HttpFetcher};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::ids::AssetIdentifier;
use crate::metadata::{AssetMetadata, UserInfo};

/// Operations the asset layer needs from the DAM
#[async_trait]
pub trait RemoteAssetClient: Send + Sync {
    /// Fetch the full description of one asset
    async fn fetch_metadata(&self, id: &AssetIdentifier) -> Result<AssetMetadata>;

    /// Register that an asset is used at `uri`.
    ///
    /// Best effort: every failure is logged and reported as `false`.
    async fn record_usage(
        &self,
        id: &AssetIdentifier,
        uri: &str,
        note: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> bool;

    /// Remove a previously registered usage; best effort like `record_usage`
    async fn clear_usage(&self, id: &AssetIdentifier, uri: &str) -> bool;

    async fn current_user(&self) -> Result<UserInfo>;
}
