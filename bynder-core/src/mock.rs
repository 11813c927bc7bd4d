//! In-memory client and fetcher for tests and offline use

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::client::{ContentFetcher, RemoteAssetClient};
use crate::error::{BynderError, Result};
use crate::ids::AssetIdentifier;
use crate::metadata::{AssetMetadata, UserInfo};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Usage call recorded by `MockClient`: ("record" | "clear", asset, uri)
pub type UsageCall = (&'static str, AssetIdentifier, String);

/// Mock DAM with a fixed set of assets
///
/// Unknown ids resolve to empty metadata, as the live API does for assets the
/// token cannot see.
pub struct MockClient {
    assets: Mutex<HashMap<AssetIdentifier, AssetMetadata>>,
    user: Mutex<UserInfo>,
    usages: Mutex<Vec<UsageCall>>,
    fetches: AtomicUsize,
    failing: AtomicBool,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            assets: Mutex::new(HashMap::new()),
            user: Mutex::new(UserInfo {
                active: true,
                ..UserInfo::default()
            }),
            usages: Mutex::new(Vec::new()),
            fetches: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_asset(self, id: AssetIdentifier, metadata: AssetMetadata) -> Self {
        lock(&self.assets).insert(id, metadata);
        self
    }

    pub fn with_user(self, user: UserInfo) -> Self {
        *lock(&self.user) = user;
        self
    }

    /// Make every remote call fail as if the API were unreachable
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn usages(&self) -> Vec<UsageCall> {
        lock(&self.usages).clone()
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteAssetClient for MockClient {
    async fn fetch_metadata(&self, id: &AssetIdentifier) -> Result<AssetMetadata> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.is_failing() {
            return Err(BynderError::RemoteUnavailable("mock API is down".to_string()));
        }
        Ok(lock(&self.assets).get(id).cloned().unwrap_or_default())
    }

    async fn record_usage(
        &self,
        id: &AssetIdentifier,
        uri: &str,
        _note: Option<&str>,
        _timestamp: Option<DateTime<Utc>>,
    ) -> bool {
        if self.is_failing() {
            return false;
        }
        lock(&self.usages).push(("record", id.clone(), uri.to_string()));
        true
    }

    async fn clear_usage(&self, id: &AssetIdentifier, uri: &str) -> bool {
        if self.is_failing() {
            return false;
        }
        lock(&self.usages).push(("clear", id.clone(), uri.to_string()));
        true
    }

    async fn current_user(&self) -> Result<UserInfo> {
        if self.is_failing() {
            return Err(BynderError::RemoteUnavailable("mock API is down".to_string()));
        }
        Ok(lock(&self.user).clone())
    }
}

/// Mock CDN serving fixed responses per URL
pub struct MockFetcher {
    responses: Mutex<HashMap<String, (Option<String>, Bytes)>>,
    downloads: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            downloads: AtomicUsize::new(0),
        }
    }

    pub fn with_response(self, url: &str, content_type: Option<&str>, body: impl Into<Bytes>) -> Self {
        lock(&self.responses).insert(
            url.to_string(),
            (content_type.map(str::to_string), body.into()),
        );
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn probe_content_type(&self, url: &str) -> Result<Option<String>> {
        lock(&self.responses)
            .get(url)
            .map(|(content_type, _)| content_type.clone())
            .ok_or_else(|| BynderError::RemoteUnavailable(format!("{} not found", url)))
    }

    async fn download(&self, url: &str) -> Result<Bytes> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        lock(&self.responses)
            .get(url)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| BynderError::RemoteUnavailable(format!("{} not found", url)))
    }
}
