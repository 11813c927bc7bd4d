//! The host storage-driver contract and its Bynder implementation
//!
//! The host addresses files and folders by opaque string identifiers. This
//! driver exposes one flat, read-only folder whose files are Bynder assets;
//! processed derivatives created by the host are addressed as
//! `processed_<asset id>_<variant>`.

mod bynder;
mod path;

pub use bynder::BynderDriver;
pub use path::{ROOT_FOLDER, VirtualPath, unwrap_processed};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use bitflags::bitflags;
use serde::Serialize;

use crate::error::{BynderError, Result};
use crate::ids::StorageUid;
use crate::property::FileInfo;

bitflags! {
    /// Storage capabilities, as numbered by the host
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        const BROWSABLE = 1;
        const PUBLIC = 2;
        const WRITABLE = 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Md5,
}

impl FromStr for HashAlgorithm {
    type Err = BynderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "md5" => Ok(HashAlgorithm::Md5),
            other => Err(BynderError::UnsupportedHashAlgorithm(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Permissions {
    pub read: bool,
    pub write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderInfo {
    pub identifier: String,
    pub name: String,
    pub mtime: i64,
    pub ctime: i64,
    pub storage: StorageUid,
}

/// Paging and sorting for folder listings
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub start: usize,
    /// 0 means no limit
    pub number_of_items: usize,
    pub recursive: bool,
    pub sort: Option<String>,
    pub sort_reverse: bool,
}

/// Storage-driver contract of the host CMS
///
/// Drivers that cannot support an operation return
/// `BynderError::NotImplemented` rather than leaving it out.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    /// Called by the host once the driver is attached
    fn initialize(&mut self);

    /// Restrict capabilities to those the storage configuration allows
    fn merge_configuration_capabilities(&mut self, capabilities: Capabilities) -> Capabilities;

    /// True when every bit of `capability` is present
    fn has_capability(&self, capability: Capabilities) -> bool;

    fn is_case_sensitive_file_system(&self) -> bool;
    fn sanitize_file_name(&self, file_name: &str) -> String;
    fn hash_identifier(&self, identifier: &str) -> String;
    fn root_level_folder(&self) -> String;
    fn default_folder(&self) -> String;
    fn parent_folder_identifier_of_identifier(&self, identifier: &str) -> String;

    async fn public_url(&self, identifier: &str) -> Result<String>;

    fn create_folder(&self, name: &str, parent: &str, recursive: bool) -> Result<String>;
    /// Old identifier to new identifier for everything below the folder
    fn rename_folder(&self, identifier: &str, new_name: &str) -> Result<HashMap<String, String>>;
    fn delete_folder(&self, identifier: &str, recursive: bool) -> Result<bool>;

    fn file_exists(&self, identifier: &str) -> bool;
    fn folder_exists(&self, identifier: &str) -> bool;
    fn is_folder_empty(&self, identifier: &str) -> bool;

    fn add_file(&self, local_path: &Path, target_folder: &str, new_name: &str, remove_original: bool) -> Result<String>;
    fn create_file(&self, name: &str, parent: &str) -> Result<String>;
    fn copy_file_within_storage(&self, identifier: &str, target_folder: &str, name: &str) -> Result<String>;
    fn rename_file(&self, identifier: &str, new_name: &str) -> Result<String>;
    fn replace_file(&self, identifier: &str, local_path: &Path) -> Result<bool>;
    fn delete_file(&self, identifier: &str) -> Result<bool>;

    fn hash(&self, identifier: &str, algorithm: &str) -> Result<String>;

    fn move_file_within_storage(&self, identifier: &str, target_folder: &str, new_name: &str) -> Result<String>;
    fn move_folder_within_storage(&self, source: &str, target: &str, new_name: &str) -> Result<HashMap<String, String>>;
    fn copy_folder_within_storage(&self, source: &str, target: &str, new_name: &str) -> Result<bool>;

    async fn file_contents(&self, identifier: &str) -> Result<Vec<u8>>;
    fn set_file_contents(&self, identifier: &str, contents: &[u8]) -> Result<u64>;

    fn file_exists_in_folder(&self, name: &str, folder: &str) -> bool;
    fn folder_exists_in_folder(&self, name: &str, folder: &str) -> bool;

    /// Local path of the file content; `writable` copies are not supported
    async fn file_for_local_processing(&self, identifier: &str, writable: bool) -> Result<PathBuf>;

    fn permissions(&self, identifier: &str) -> Permissions;
    fn dump_file_contents(&self, identifier: &str) -> Result<()>;
    fn is_within(&self, folder: &str, identifier: &str) -> bool;

    async fn file_info_by_identifier(&self, identifier: &str, keys: &[String]) -> Result<FileInfo>;
    fn folder_info_by_identifier(&self, identifier: &str) -> FolderInfo;

    fn file_in_folder(&self, name: &str, folder: &str) -> String;
    fn files_in_folder(&self, folder: &str, options: &ListOptions) -> Vec<String>;
    fn folder_in_folder(&self, name: &str, folder: &str) -> String;
    fn folders_in_folder(&self, folder: &str, options: &ListOptions) -> Vec<String>;
    fn count_files_in_folder(&self, folder: &str, recursive: bool) -> usize;
    fn count_folders_in_folder(&self, folder: &str, recursive: bool) -> usize;
}
