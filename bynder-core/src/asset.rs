//! A single remote asset with lazily resolved metadata

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use futures::future::join_all;
use sha1::{Digest, Sha1};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::context::AssetContext;
use crate::error::{BynderError, Result};
use crate::ids::{AssetIdentifier, StorageUid};
use crate::metadata::{AssetKind, AssetMetadata, DERIVATIVE_WEB_IMAGE};
use crate::property::{FileInfo, Property, PropertyValue};

/// Metadata state of an Asset; resolved at most once
enum Information {
    Unresolved,
    Resolved(Arc<AssetMetadata>),
}

/// A playable source of a video or audio asset
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StreamSource {
    pub url: String,
    pub content_type: String,
}

pub struct Asset {
    identifier: AssetIdentifier,
    context: AssetContext,
    information: Mutex<Information>,
}

impl Asset {
    pub fn new(identifier: AssetIdentifier, context: AssetContext) -> Self {
        Self {
            identifier,
            context,
            information: Mutex::new(Information::Unresolved),
        }
    }

    pub fn identifier(&self) -> &AssetIdentifier {
        &self.identifier
    }

    pub fn storage(&self) -> StorageUid {
        self.context.storage
    }

    /// Metadata of this asset, fetched on first use.
    ///
    /// Remote failures degrade to empty metadata; the failure is logged, not
    /// returned, and the empty result is kept for the lifetime of the Asset.
    pub async fn information(&self) -> Arc<AssetMetadata> {
        let mut state = self.information.lock().await;
        if let Information::Resolved(metadata) = &*state {
            return metadata.clone();
        }

        let metadata = match self.context.client.fetch_metadata(&self.identifier).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(id = %self.identifier, "Could not fetch asset information: {}", e);
                AssetMetadata::default()
            }
        };
        let metadata = Arc::new(metadata);
        *state = Information::Resolved(metadata.clone());
        metadata
    }

    pub async fn kind(&self) -> Option<AssetKind> {
        self.information().await.asset_kind()
    }

    pub async fn is_image(&self) -> bool {
        self.kind().await == Some(AssetKind::Image)
    }

    pub async fn is_video(&self) -> bool {
        self.kind().await == Some(AssetKind::Video)
    }

    pub async fn is_audio(&self) -> bool {
        self.kind().await == Some(AssetKind::Audio)
    }

    pub async fn is_document(&self) -> bool {
        self.kind().await == Some(AssetKind::Document)
    }

    /// True pixel dimensions, when the DAM reports them
    pub async fn dimensions(&self) -> Option<(u64, u64)> {
        let info = self.information().await;
        info.width.zip(info.height)
    }

    /// URL of a derivative, falling back to `webimage`
    pub async fn thumbnail(&self, derivative: &str) -> Result<String> {
        let info = self.information().await;
        info.thumbnail(derivative)
            .or_else(|| info.thumbnail(DERIVATIVE_WEB_IMAGE))
            .map(str::to_string)
            .ok_or_else(|| BynderError::NoThumbnail(self.identifier.to_string()))
    }

    /// Preview sources with a known content type, in metadata order.
    ///
    /// URLs that are malformed, unreachable, or report no content type are
    /// skipped.
    pub async fn streams(&self) -> Vec<StreamSource> {
        let info = self.information().await;
        let urls: Vec<&String> = info
            .video_preview_urls
            .iter()
            .filter(|url| is_http_url(url))
            .collect();

        let probes = urls
            .iter()
            .map(|url| self.context.fetcher.probe_content_type(url));
        let results = join_all(probes).await;

        urls.into_iter()
            .zip(results)
            .filter_map(|(url, result)| match result {
                Ok(Some(content_type)) => Some(StreamSource {
                    url: url.clone(),
                    content_type,
                }),
                Ok(None) => {
                    debug!(url = %url, "Stream has no content type");
                    None
                }
                Err(e) => {
                    debug!(url = %url, "Skipping stream: {}", e);
                    None
                }
            })
            .collect()
    }

    /// Resized public URL from the on-the-fly endpoint.
    ///
    /// Width and height use the dimension grammar (`200`, `200m`, `200c`);
    /// crop is requested when either carries a `c`. Private assets, or a
    /// missing endpoint, fall back to the default thumbnail.
    pub async fn on_the_fly_public_url(&self, width: &str, height: &str) -> Result<String> {
        let info = self.information().await;
        match &self.context.on_the_fly_base_url {
            Some(base) if info.is_public => {
                let base = if base.ends_with('/') {
                    base.clone()
                } else {
                    format!("{}/", base)
                };
                let crop = width.contains('c') || height.contains('c');
                Ok(format!(
                    "{}{}?w={}&h={}&crop={}",
                    base,
                    self.identifier,
                    leading_int(width),
                    leading_int(height),
                    u8::from(crop)
                ))
            }
            _ => self.thumbnail(DERIVATIVE_WEB_IMAGE).await,
        }
    }

    /// Properties for `keys`; no keys means the default set
    pub async fn extract_properties<S: AsRef<str>>(&self, keys: &[S]) -> Result<FileInfo> {
        let properties: Vec<Property> = if keys.is_empty() {
            Property::DEFAULT.to_vec()
        } else {
            keys.iter()
                .map(|k| k.as_ref().parse::<Property>())
                .collect::<Result<_>>()?
        };

        let mut info = FileInfo::new();
        for property in properties {
            info.insert(property, self.property(property).await);
        }
        Ok(info)
    }

    pub async fn specific_property(&self, key: &str) -> Result<PropertyValue> {
        Ok(self.property(key.parse()?).await)
    }

    pub async fn property(&self, property: Property) -> PropertyValue {
        let info = self.information().await;
        match property {
            Property::Size => info.file_size.map(|s| s as i64).into(),
            Property::Atime | Property::Mtime => {
                parse_timestamp(info.date_modified.as_deref()).into()
            }
            Property::Ctime => parse_timestamp(info.date_created.as_deref()).into(),
            Property::Mimetype => info.kind.as_ref().map(|k| format!("bynder/{}", k)).into(),
            Property::Name => info
                .name
                .as_ref()
                .map(|name| format!("{}.{}", name, extension(info.asset_kind())))
                .into(),
            Property::Extension => PropertyValue::Text(extension(info.asset_kind()).to_string()),
            Property::Identifier => PropertyValue::Text(self.identifier_value(&info)),
            Property::IdentifierHash => PropertyValue::Text(sha1_hex(&self.identifier_value(&info))),
            Property::Storage => PropertyValue::Integer(i64::from(self.context.storage.0)),
            Property::FolderHash => {
                PropertyValue::Text(sha1_hex(&format!("bynder{}", self.context.storage)))
            }
            Property::Title => info.name.clone().into(),
            Property::Description => info.description.clone().into(),
            Property::Width => info.width.map(|w| w as i64).into(),
            Property::Height => info.height.map(|h| h as i64).into(),
            Property::Copyright => info.copyright.clone().into(),
            Property::Keywords => PropertyValue::Text(info.tags.join(", ")),
        }
    }

    fn identifier_value(&self, info: &AssetMetadata) -> String {
        info.id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.identifier.to_string())
    }

    /// Absolute path of a local copy of `derivative`, downloading it if needed
    pub async fn local_thumbnail_path(&self, derivative: &str) -> Result<PathBuf> {
        let url = self
            .thumbnail(derivative)
            .await
            .map_err(|e| BynderError::ThumbnailUnavailable(e.to_string()))?;
        let path = self.context.scratch.path_for(&url);

        if self.context.scratch.exists(&path).await {
            debug!(path = %path.display(), "Reusing local copy");
            return Ok(path);
        }

        let data = self.context.fetcher.download(&url).await.map_err(|e| {
            BynderError::ThumbnailUnavailable(format!("{}: {}", url, e))
        })?;
        if data.is_empty() {
            return Err(BynderError::ThumbnailUnavailable(format!("{}: empty response", url)));
        }

        self.context
            .scratch
            .store(&path, &data)
            .await
            .map_err(|e| BynderError::ThumbnailUnavailable(format!("{}: {}", path.display(), e)))?;
        info!(id = %self.identifier, path = %path.display(), "Stored local copy");
        Ok(path)
    }

    /// Local copy of `derivative` as an absolute path, or relative to the site
    /// root with a leading `/`
    pub async fn local_thumbnail(&self, derivative: &str, absolute: bool) -> Result<String> {
        let path = self.local_thumbnail_path(derivative).await?;
        if absolute {
            Ok(path.to_string_lossy().into_owned())
        } else {
            Ok(self.context.scratch.relative(&path))
        }
    }

    /// Bytes of the local copy of `derivative`
    pub async fn contents(&self, derivative: &str) -> Result<Vec<u8>> {
        let path = self.local_thumbnail_path(derivative).await?;
        self.context
            .scratch
            .read(&path)
            .await
            .map_err(|e| BynderError::ThumbnailUnavailable(format!("{}: {}", path.display(), e)))
    }

    pub async fn record_usage(
        &self,
        uri: &str,
        note: Option<&str>,
        timestamp: Option<DateTime<Utc>>,
    ) -> bool {
        self.context
            .client
            .record_usage(&self.identifier, uri, note, timestamp)
            .await
    }

    pub async fn clear_usage(&self, uri: &str) -> bool {
        self.context.client.clear_usage(&self.identifier, uri).await
    }
}

/// Pseudo file extension by kind
pub fn extension(kind: Option<AssetKind>) -> &'static str {
    match kind {
        Some(AssetKind::Image) => "bynder.jpg",
        Some(AssetKind::Document) => "bynder.pdf",
        Some(AssetKind::Video) => "bynder.mp4",
        Some(AssetKind::Audio) => "bynder.mp3",
        None => "bynder",
    }
}

pub(crate) fn sha1_hex(s: &str) -> String {
    hex::encode(Sha1::digest(s.as_bytes()))
}

fn is_http_url(s: &str) -> bool {
    url::Url::parse(s).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Integer prefix of a dimension string: "200c" is 200, "" is 0
pub(crate) fn leading_int(s: &str) -> u64 {
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    // Only overflow can fail here; an oversized request stays oversized
    digits.parse().unwrap_or(u64::MAX)
}

/// Unix seconds of an ISO-8601 timestamp; naive timestamps are taken as UTC
fn parse_timestamp(value: Option<&str>) -> Option<i64> {
    let value = value?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.timestamp());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .into_iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::StorageUid;
    use crate::mock::{MockClient, MockFetcher};
    use crate::scratch::ScratchStore;
    use std::collections::BTreeMap;

    const ID: &str = "12345678-abcd-ef01-23456789abcdef01";

    fn id() -> AssetIdentifier {
        AssetIdentifier::new(ID).unwrap()
    }

    fn logo() -> AssetMetadata {
        AssetMetadata {
            id: Some(ID.to_string()),
            name: Some("Logo".to_string()),
            description: Some("Company logo".to_string()),
            copyright: Some("ACME".to_string()),
            tags: vec!["brand".to_string(), "logo".to_string()],
            kind: Some("image".to_string()),
            width: Some(1000),
            height: Some(500),
            file_size: Some(2048),
            date_created: Some("2021-03-01T10:00:00Z".to_string()),
            date_modified: Some("2021-03-02T10:00:00+00:00".to_string()),
            is_public: true,
            thumbnails: BTreeMap::from([
                ("webimage".to_string(), "https://cdn.example.com/m/1/webimage-Logo.png".to_string()),
                ("mini".to_string(), "https://cdn.example.com/m/1/mini-Logo.png".to_string()),
            ]),
            video_preview_urls: Vec::new(),
        }
    }

    fn scratch() -> ScratchStore {
        let site = std::env::temp_dir().join(format!("asset_test_{}", uuid::Uuid::new_v4()));
        ScratchStore::new(site.join("temp/assets/bynder"), site)
    }

    fn asset_with(client: MockClient, fetcher: MockFetcher) -> (Asset, Arc<MockClient>, Arc<MockFetcher>) {
        let client = Arc::new(client);
        let fetcher = Arc::new(fetcher);
        let context = AssetContext::new(client.clone(), fetcher.clone(), scratch(), StorageUid(7));
        (Asset::new(id(), context), client, fetcher)
    }

    fn logo_asset() -> Asset {
        asset_with(MockClient::new().with_asset(id(), logo()), MockFetcher::new()).0
    }

    #[tokio::test]
    async fn test_information_fetched_once() {
        let (asset, client, _) = asset_with(MockClient::new().with_asset(id(), logo()), MockFetcher::new());
        assert!(asset.is_image().await);
        assert!(!asset.is_video().await);
        asset.thumbnail("mini").await.unwrap();
        assert_eq!(client.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_empty() {
        let client = MockClient::new().with_asset(id(), logo());
        client.set_failing(true);
        let (asset, _, _) = asset_with(client, MockFetcher::new());

        assert!(asset.information().await.is_empty());
        assert!(!asset.is_image().await);
        assert!(asset.kind().await.is_none());
    }

    #[tokio::test]
    async fn test_thumbnail_fallback() {
        let asset = logo_asset();
        assert_eq!(asset.thumbnail("mini").await.unwrap(), "https://cdn.example.com/m/1/mini-Logo.png");
        assert_eq!(asset.thumbnail("thul").await.unwrap(), "https://cdn.example.com/m/1/webimage-Logo.png");

        let (bare, _, _) = asset_with(MockClient::new(), MockFetcher::new());
        assert!(matches!(bare.thumbnail("thul").await, Err(BynderError::NoThumbnail(_))));
    }

    #[tokio::test]
    async fn test_properties() {
        let asset = logo_asset();

        let get = |key: &'static str| {
            let asset = &asset;
            async move { asset.specific_property(key).await.unwrap() }
        };

        assert_eq!(get("extension").await, PropertyValue::Text("bynder.jpg".to_string()));
        assert_eq!(get("name").await, PropertyValue::Text("Logo.bynder.jpg".to_string()));
        assert_eq!(get("mimetype").await, PropertyValue::Text("bynder/image".to_string()));
        assert_eq!(get("size").await, PropertyValue::Integer(2048));
        assert_eq!(get("ctime").await, PropertyValue::Integer(1614592800));
        assert_eq!(get("mtime").await, PropertyValue::Integer(1614679200));
        assert_eq!(get("atime").await, get("mtime").await);
        assert_eq!(get("identifier").await, PropertyValue::Text(ID.to_string()));
        assert_eq!(get("identifier_hash").await, PropertyValue::Text(sha1_hex(ID)));
        assert_eq!(get("storage").await, PropertyValue::Integer(7));
        assert_eq!(get("folder_hash").await, PropertyValue::Text(sha1_hex("bynder7")));
        assert_eq!(get("title").await, PropertyValue::Text("Logo".to_string()));
        assert_eq!(get("description").await, PropertyValue::Text("Company logo".to_string()));
        assert_eq!(get("width").await, PropertyValue::Integer(1000));
        assert_eq!(get("height").await, PropertyValue::Integer(500));
        assert_eq!(get("copyright").await, PropertyValue::Text("ACME".to_string()));
        assert_eq!(get("keywords").await, PropertyValue::Text("brand, logo".to_string()));

        assert!(matches!(
            asset.specific_property("colour").await,
            Err(BynderError::UnknownProperty(_))
        ));
    }

    #[tokio::test]
    async fn test_default_property_set() {
        let keys: [&str; 0] = [];
        let info = logo_asset().extract_properties(&keys).await.unwrap();
        assert_eq!(info.keys().copied().collect::<Vec<_>>(), Property::DEFAULT.to_vec());
    }

    #[tokio::test]
    async fn test_requested_properties_only() {
        let info = logo_asset().extract_properties(&["width", "title"]).await.unwrap();
        assert_eq!(info.len(), 2);
        assert_eq!(info[&Property::Title], PropertyValue::Text("Logo".to_string()));
    }

    #[tokio::test]
    async fn test_empty_metadata_properties() {
        let (asset, _, _) = asset_with(MockClient::new(), MockFetcher::new());
        assert_eq!(asset.specific_property("extension").await.unwrap(), PropertyValue::Text("bynder".to_string()));
        assert_eq!(asset.specific_property("identifier").await.unwrap(), PropertyValue::Text(ID.to_string()));
        assert!(asset.specific_property("name").await.unwrap().is_null());
        assert!(asset.specific_property("size").await.unwrap().is_null());
        assert_eq!(asset.specific_property("keywords").await.unwrap(), PropertyValue::Text(String::new()));
    }

    #[tokio::test]
    async fn test_streams_skip_invalid_and_unreachable() {
        let mut video = logo();
        video.kind = Some("video".to_string());
        video.video_preview_urls = vec![
            "https://cdn.example.com/v/1.mp4".to_string(),
            "not a url".to_string(),
            "https://cdn.example.com/v/missing.webm".to_string(),
            "https://cdn.example.com/v/untyped.ogv".to_string(),
            "https://cdn.example.com/v/1.webm".to_string(),
        ];
        let fetcher = MockFetcher::new()
            .with_response("https://cdn.example.com/v/1.mp4", Some("video/mp4"), "")
            .with_response("https://cdn.example.com/v/untyped.ogv", None, "")
            .with_response("https://cdn.example.com/v/1.webm", Some("video/webm"), "");
        let (asset, _, _) = asset_with(MockClient::new().with_asset(id(), video), fetcher);

        let streams = asset.streams().await;
        assert!(asset.is_video().await);
        assert_eq!(
            streams,
            vec![
                StreamSource {
                    url: "https://cdn.example.com/v/1.mp4".to_string(),
                    content_type: "video/mp4".to_string()
                },
                StreamSource {
                    url: "https://cdn.example.com/v/1.webm".to_string(),
                    content_type: "video/webm".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_on_the_fly_url() {
        let client = Arc::new(MockClient::new().with_asset(id(), logo()));
        let context = AssetContext::new(client, Arc::new(MockFetcher::new()), scratch(), StorageUid(1))
            .with_on_the_fly_base_url("https://otf.example.com/transform");
        let asset = Asset::new(id(), context);

        assert_eq!(
            asset.on_the_fly_public_url("200c", "100c").await.unwrap(),
            format!("https://otf.example.com/transform/{}?w=200&h=100&crop=1", ID)
        );
        assert_eq!(
            asset.on_the_fly_public_url("300m", "").await.unwrap(),
            format!("https://otf.example.com/transform/{}?w=300&h=0&crop=0", ID)
        );
    }

    #[tokio::test]
    async fn test_on_the_fly_falls_back_for_private_assets() {
        let mut private = logo();
        private.is_public = false;
        let client = Arc::new(MockClient::new().with_asset(id(), private));
        let context = AssetContext::new(client, Arc::new(MockFetcher::new()), scratch(), StorageUid(1))
            .with_on_the_fly_base_url("https://otf.example.com/");
        let asset = Asset::new(id(), context);

        assert_eq!(
            asset.on_the_fly_public_url("200", "100").await.unwrap(),
            "https://cdn.example.com/m/1/webimage-Logo.png"
        );

        // Public, but no endpoint configured
        assert_eq!(
            logo_asset().on_the_fly_public_url("200", "100").await.unwrap(),
            "https://cdn.example.com/m/1/webimage-Logo.png"
        );
    }

    #[tokio::test]
    async fn test_local_thumbnail_downloads_once() {
        let fetcher = MockFetcher::new()
            .with_response("https://cdn.example.com/m/1/webimage-Logo.png", Some("image/png"), "png bytes");
        let (asset, _, fetcher) = asset_with(MockClient::new().with_asset(id(), logo()), fetcher);

        let absolute = asset.local_thumbnail("webimage", true).await.unwrap();
        assert!(absolute.ends_with("webimage-Logo.png"));
        let relative = asset.local_thumbnail("webimage", false).await.unwrap();
        assert_eq!(relative, "/temp/assets/bynder/webimage-Logo.png");
        assert_eq!(asset.contents("webimage").await.unwrap(), b"png bytes");
        assert_eq!(fetcher.download_count(), 1);

        let site = asset.context.scratch.root().to_path_buf();
        tokio::fs::remove_dir_all(site).await.ok();
    }

    #[tokio::test]
    async fn test_local_thumbnail_failures() {
        // Derivative URL not served
        let (asset, _, _) = asset_with(MockClient::new().with_asset(id(), logo()), MockFetcher::new());
        assert!(matches!(
            asset.local_thumbnail("webimage", true).await,
            Err(BynderError::ThumbnailUnavailable(_))
        ));

        // Empty body
        let fetcher = MockFetcher::new()
            .with_response("https://cdn.example.com/m/1/webimage-Logo.png", Some("image/png"), "");
        let (asset, _, _) = asset_with(MockClient::new().with_asset(id(), logo()), fetcher);
        assert!(matches!(
            asset.local_thumbnail("webimage", true).await,
            Err(BynderError::ThumbnailUnavailable(_))
        ));

        // No derivative at all
        let (asset, _, _) = asset_with(MockClient::new(), MockFetcher::new());
        assert!(matches!(
            asset.local_thumbnail("webimage", false).await,
            Err(BynderError::ThumbnailUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_usage_goes_through_client() {
        let (asset, client, _) = asset_with(MockClient::new(), MockFetcher::new());
        assert!(asset.record_usage("page:3", Some("hero image"), None).await);
        assert!(asset.clear_usage("page:3").await);
        assert_eq!(client.usages().len(), 2);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("200c"), 200);
        assert_eq!(leading_int("75m"), 75);
        assert_eq!(leading_int(""), 0);
        assert_eq!(leading_int("c"), 0);
        assert_eq!(leading_int("99999999999999999999999m"), u64::MAX);
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp(Some("1970-01-01T00:01:00Z")), Some(60));
        assert_eq!(parse_timestamp(Some("1970-01-01 00:01:00")), Some(60));
        assert_eq!(parse_timestamp(Some("yesterday")), None);
        assert_eq!(parse_timestamp(None), None);
    }
}
