use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::client::RemoteAssetClient;
use crate::error::Result;
use crate::ids::AssetIdentifier;
use crate::metadata::{AssetMetadata, UserInfo};

/// Lifetime of a cached metadata entry
pub const METADATA_TTL: Duration = Duration::from_secs(60);

/// Wrapper that adds a short-lived metadata cache to any RemoteAssetClient
///
/// Only successful `fetch_metadata` results are cached. Concurrent misses for
/// the same id may fetch twice; the last write wins.
pub struct MetadataCache<C: RemoteAssetClient> {
    inner: C,
    cache: Arc<RwLock<HashMap<AssetIdentifier, CachedEntry>>>,
    ttl: Duration,
}

struct CachedEntry {
    metadata: AssetMetadata,
    timestamp: Instant,
}

impl<C: RemoteAssetClient> MetadataCache<C> {
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Create a cache with the default 60 second TTL
    pub fn with_default_ttl(inner: C) -> Self {
        Self::new(inner, METADATA_TTL)
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.clear();
    }

    /// Number of entries held, expired or not
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    /// Drop expired entries; misses also do this before inserting
    pub async fn evict_expired(&self) -> usize {
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|_, entry| entry.timestamp.elapsed() < self.ttl);
        before - cache.len()
    }
}

#[async_trait]
impl<C: RemoteAssetClient> RemoteAssetClient for MetadataCache<C> {
    async fn fetch_metadata(&self, id: &AssetIdentifier) -> Result<AssetMetadata> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(id) {
                if entry.timestamp.elapsed() < self.ttl {
                    debug!(%id, "Metadata cache hit");
                    return Ok(entry.metadata.clone());
                }
            }
        }

        debug!(%id, "Metadata cache miss");
        let metadata = self.inner.fetch_metadata(id).await?;

        {
            let mut cache = self.cache.write().await;
            cache.retain(|_, entry| entry.timestamp.elapsed() < self.ttl);
            cache.insert(
                id.clone(),
                CachedEntry {
                    metadata: metadata.clone(),
                    timestamp: Instant::now(),
                },
            );
        }

        Ok(metadata)
    }

    async fn record_usage(
        &self,
        id: &AssetIdentifier,
        uri: &str,
        note: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> bool {
        self.inner.record_usage(id, uri, note, timestamp).await
    }

    async fn clear_usage(&self, id: &AssetIdentifier, uri: &str) -> bool {
        self.inner.clear_usage(id, uri).await
    }

    async fn current_user(&self) -> Result<UserInfo> {
        self.inner.current_user().await
    }
}
