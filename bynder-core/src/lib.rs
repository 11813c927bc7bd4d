//! Bynder DAM assets as a read-only virtual filesystem
//!
//! This crate provides:
//! - **Client**: `RemoteAssetClient` with the OAuth 1.0a `BynderClient`, and `ContentFetcher` for CDN content
//! - **Cache**: `MetadataCache`, a 60 second TTL cache in front of any client
//! - **Assets**: `Asset` with lazily resolved metadata, and `AssetResolver` handing out one Asset per id
//! - **Driver**: the `StorageDriver` contract and the read-only `BynderDriver`
//! - **Extras**: dimension calculation, preview rendering, metadata indexing, diagnostics
//!
//! # Example
//!
//! ```ignore
//! use bynder_core::{AssetContext, AssetResolver, BynderDriver, StorageDriver};
//!
//! let context = AssetContext::from_settings(&settings)?;
//! let mut driver = BynderDriver::new(Arc::new(AssetResolver::new(context)));
//! driver.initialize();
//! let info = driver.file_info_by_identifier(id, &[]).await?;
//! ```
pub mod asset;
pub mod cache;
pub mod client;
pub mod context;
pub mod diagnostics;
pub mod dimensions;
pub mod driver;
pub mod error;
pub mod ids;
pub mod indexer;
pub mod metadata;
pub mod mock;
pub mod property;
pub mod rendering;
pub mod resolver;
pub mod scratch;
pub mod traffic_log;

pub use asset::{Asset, StreamSource};
pub use cache::{METADATA_TTL, MetadataCache};
pub use client::{BynderClient, ContentFetcher, HttpFetcher, RemoteAssetClient};
pub use context::AssetContext;
pub use diagnostics::{Severity, StatusMessage, check_api_user};
pub use dimensions::{Dimensions, calculate_dimensions};
pub use driver::{BynderDriver, Capabilities, FolderInfo, HashAlgorithm, ListOptions, Permissions, StorageDriver, VirtualPath};
pub use error::{BynderError, Result};
pub use ids::{AssetIdentifier, StorageUid};
pub use indexer::{AttachedAsset, MetadataExtractor, attach_assets};
pub use metadata::{AssetKind, AssetMetadata, UserInfo, asset_types_by_allowed_elements};
pub use property::{FileInfo, Property, PropertyValue};
pub use rendering::{Rendition, preview_url, render};
pub use resolver::AssetResolver;
pub use scratch::ScratchStore;
