use std::sync::Arc;
use std::time::Duration;

use config::Settings;

use crate::cache::MetadataCache;
use crate::client::{BynderClient, ContentFetcher, HttpFetcher, RemoteAssetClient};
use crate::error::Result;
use crate::ids::StorageUid;
use crate::scratch::ScratchStore;

/// Everything an Asset needs besides its identifier
///
/// Built once per process and shared; the metadata cache lives inside `client`.
#[derive(Clone)]
pub struct AssetContext {
    pub client: Arc<dyn RemoteAssetClient>,
    pub fetcher: Arc<dyn ContentFetcher>,
    pub scratch: ScratchStore,
    pub storage: StorageUid,
    /// Base of the on-the-fly resize endpoint, with trailing slash
    pub on_the_fly_base_url: Option<String>,
}

impl AssetContext {
    pub fn new(
        client: Arc<dyn RemoteAssetClient>,
        fetcher: Arc<dyn ContentFetcher>,
        scratch: ScratchStore,
        storage: StorageUid,
    ) -> Self {
        Self {
            client,
            fetcher,
            scratch,
            storage,
            on_the_fly_base_url: None,
        }
    }

    pub fn with_on_the_fly_base_url(mut self, url: impl Into<String>) -> Self {
        self.on_the_fly_base_url = Some(url.into());
        self
    }

    /// Wire the live Bynder client behind the metadata cache
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let client = MetadataCache::with_default_ttl(BynderClient::from_settings(settings)?);
        let fetcher = HttpFetcher::new(Duration::from_secs(settings.request_timeout_secs()))?;
        Ok(Self {
            client: Arc::new(client),
            fetcher: Arc::new(fetcher),
            scratch: ScratchStore::from_settings(settings),
            storage: StorageUid(settings.storage_uid),
            on_the_fly_base_url: settings.on_the_fly_base_url(),
        })
    }
}
