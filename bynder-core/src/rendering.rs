//! What a host renderer needs to embed an asset

use serde::Serialize;
use tracing::warn;

use crate::asset::{Asset, StreamSource};
use crate::dimensions::{Dimensions, calculate_dimensions};
use crate::error::{BynderError, Result};
use crate::metadata::AssetKind;

/// Embeddable form of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rendition {
    /// Images and documents render as their preview image
    Image {
        src: String,
        width: u64,
        height: u64,
    },
    Video {
        sources: Vec<StreamSource>,
        poster: String,
    },
    Audio {
        sources: Vec<StreamSource>,
    },
}

async fn target_dimensions(asset: &Asset, width: &str, height: &str) -> Dimensions {
    let (original_width, original_height) = asset.dimensions().await.unwrap_or((0, 0));
    calculate_dimensions(original_width, original_height, width, height)
}

/// Preview URL for `width` x `height` (dimension grammar).
///
/// Never fails: a missing thumbnail yields `unavailable_image`.
pub async fn preview_url(asset: &Asset, width: &str, height: &str, unavailable_image: &str) -> String {
    let dimensions = target_dimensions(asset, width, height).await;
    resolve_url(asset, &dimensions, unavailable_image).await
}

async fn resolve_url(asset: &Asset, dimensions: &Dimensions, unavailable_image: &str) -> String {
    match asset
        .on_the_fly_public_url(&dimensions.width_param(), &dimensions.height_param())
        .await
    {
        Ok(url) => url,
        Err(BynderError::NoThumbnail(_)) => unavailable_image.to_string(),
        Err(e) => {
            warn!(id = %asset.identifier(), "Preview unavailable: {}", e);
            unavailable_image.to_string()
        }
    }
}

/// Pick the embedding for an asset by kind
pub async fn render(asset: &Asset, width: &str, height: &str, unavailable_image: &str) -> Result<Rendition> {
    let dimensions = target_dimensions(asset, width, height).await;
    match asset.kind().await {
        Some(AssetKind::Image | AssetKind::Document) => Ok(Rendition::Image {
            src: resolve_url(asset, &dimensions, unavailable_image).await,
            width: dimensions.width,
            height: dimensions.height,
        }),
        Some(AssetKind::Video) => Ok(Rendition::Video {
            sources: asset.streams().await,
            poster: resolve_url(asset, &dimensions, unavailable_image).await,
        }),
        Some(AssetKind::Audio) => Ok(Rendition::Audio {
            sources: asset.streams().await,
        }),
        None => Err(BynderError::UnsupportedAsset(asset.identifier().to_string())),
    }
}
