//! Remote asset description as returned by the Bynder media endpoint

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use config::AssetTypeExtensions;
use serde::{Deserialize, Deserializer, Serialize};

/// Default derivative, always generated by Bynder for previewable assets
pub const DERIVATIVE_WEB_IMAGE: &str = "webimage";
pub const DERIVATIVE_MINI: &str = "mini";
pub const DERIVATIVE_THUMBNAIL: &str = "thul";

/// Metadata of one Bynder asset
///
/// Every field is optional: a failed or empty lookup yields `AssetMetadata::default()`,
/// which the asset layer treats as "unknown" rather than as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetMetadata {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub copyright: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub width: Option<u64>,
    pub height: Option<u64>,
    pub file_size: Option<u64>,
    pub date_created: Option<String>,
    pub date_modified: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_public: bool,
    /// Derivative name to URL
    #[serde(deserialize_with = "string_entries")]
    pub thumbnails: BTreeMap<String, String>,
    #[serde(rename = "videoPreviewURLs", deserialize_with = "null_as_empty")]
    pub video_preview_urls: Vec<String>,
}

impl AssetMetadata {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn asset_kind(&self) -> Option<AssetKind> {
        self.kind.as_deref().and_then(|k| k.parse().ok())
    }

    pub fn thumbnail(&self, derivative: &str) -> Option<&str> {
        self.thumbnails.get(derivative).map(String::as_str)
    }
}

/// Asset kinds Bynder distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    Audio,
    Document,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Audio => "audio",
            AssetKind::Document => "document",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(AssetKind::Image),
            "video" => Ok(AssetKind::Video),
            "audio" => Ok(AssetKind::Audio),
            "document" => Ok(AssetKind::Document),
            other => Err(format!("unknown asset kind: {}", other)),
        }
    }
}

/// Subset of the current-user response used by diagnostics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub active: bool,
}

/// Map a comma-separated list of allowed file extensions to the asset kinds
/// the picker should offer.
///
/// A kind is offered when any of its configured extensions is allowed. An
/// empty allow-list offers images and videos.
pub fn asset_types_by_allowed_elements(
    allowed: &str,
    extensions: &AssetTypeExtensions,
) -> Vec<AssetKind> {
    let allowed: Vec<String> = split_list(allowed);
    if allowed.is_empty() {
        return vec![AssetKind::Image, AssetKind::Video];
    }

    extensions
        .entries()
        .into_iter()
        .filter(|(_, list)| split_list(list).iter().any(|ext| allowed.contains(ext)))
        .filter_map(|(kind, _)| kind.parse().ok())
        .collect()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Bynder reports flags as `true`, `1`, or `"1"` depending on the endpoint
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        serde_json::Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    })
}

/// Keep only string entries; the thumbnail object also carries non-URL fields
fn string_entries<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, s)),
            _ => None,
        })
        .collect())
}
