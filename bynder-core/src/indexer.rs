//! Metadata extraction for the host's file index, and the picker callback

use serde::Serialize;
use tracing::{info, warn};

use crate::asset::Asset;
use crate::error::{BynderError, Result};
use crate::property::{FileInfo, Property};
use crate::resolver::AssetResolver;

/// Mimetype prefix the driver reports for every asset
pub const MIMETYPE_PREFIX: &str = "bynder/";

/// Fills the host's metadata index from Bynder
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub const PRIORITY: u32 = 10;

    pub fn can_process(&self, mimetype: &str) -> bool {
        mimetype.starts_with(MIMETYPE_PREFIX)
    }

    /// Descriptive properties; images also get their dimensions
    pub async fn extract_metadata(&self, asset: &Asset) -> Result<FileInfo> {
        let mut keys = vec![
            Property::Title,
            Property::Description,
            Property::Copyright,
            Property::Keywords,
        ];
        if asset.is_image().await {
            keys.extend([Property::Height, Property::Width]);
        }

        let mut info = FileInfo::new();
        for key in keys {
            info.insert(key, asset.property(key).await);
        }
        Ok(info)
    }
}

/// An asset the user picked, with its freshly extracted metadata
#[derive(Debug, Clone, Serialize)]
pub struct AttachedAsset {
    pub identifier: String,
    pub metadata: FileInfo,
}

/// Picker callback: index every chosen asset and return the ones accepted.
///
/// Ids that are not valid asset identifiers are skipped. Fails with
/// `NoFilesAttached` when nothing is left.
pub async fn attach_assets<S: AsRef<str>>(resolver: &AssetResolver, ids: &[S]) -> Result<Vec<AttachedAsset>> {
    let extractor = MetadataExtractor;
    let mut attached = Vec::new();

    for id in ids {
        let asset = match resolver.get_or_create(id.as_ref()) {
            Ok(asset) => asset,
            Err(e) => {
                warn!("Skipping picked file: {}", e);
                continue;
            }
        };
        let metadata = extractor.extract_metadata(&asset).await?;
        attached.push(AttachedAsset {
            identifier: asset.identifier().to_string(),
            metadata,
        });
    }

    if attached.is_empty() {
        return Err(BynderError::NoFilesAttached);
    }
    info!(count = attached.len(), "Attached assets");
    Ok(attached)
}
