use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use md5::Md5;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::path::{ROOT_FOLDER, VirtualPath, unwrap_processed};
use super::{Capabilities, FolderInfo, HashAlgorithm, ListOptions, Permissions, StorageDriver};
use crate::asset::Asset;
use crate::error::{BynderError, Result};
use crate::metadata::DERIVATIVE_WEB_IMAGE;
use crate::property::FileInfo;
use crate::resolver::AssetResolver;

const FOLDER_NAME: &str = "Bynder";

/// Read-only driver presenting Bynder assets as files in one flat folder
pub struct BynderDriver {
    resolver: Arc<AssetResolver>,
    capabilities: Capabilities,
}

impl BynderDriver {
    /// Capabilities stay empty until the host calls `initialize`
    pub fn new(resolver: Arc<AssetResolver>) -> Self {
        Self {
            resolver,
            capabilities: Capabilities::empty(),
        }
    }

    pub fn resolver(&self) -> &Arc<AssetResolver> {
        &self.resolver
    }

    /// Asset behind a file identifier; processed files resolve to their source
    fn asset(&self, identifier: &str) -> Result<Arc<Asset>> {
        self.resolver.get_or_create(unwrap_processed(identifier))
    }
}

#[async_trait]
impl StorageDriver for BynderDriver {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn initialize(&mut self) {
        self.capabilities = Capabilities::BROWSABLE | Capabilities::PUBLIC | Capabilities::WRITABLE;
    }

    fn merge_configuration_capabilities(&mut self, capabilities: Capabilities) -> Capabilities {
        self.capabilities &= capabilities;
        self.capabilities
    }

    fn has_capability(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    fn is_case_sensitive_file_system(&self) -> bool {
        true
    }

    fn sanitize_file_name(&self, file_name: &str) -> String {
        file_name.to_string()
    }

    fn hash_identifier(&self, identifier: &str) -> String {
        hex::encode(Sha1::digest(identifier.as_bytes()))
    }

    fn root_level_folder(&self) -> String {
        ROOT_FOLDER.to_string()
    }

    fn default_folder(&self) -> String {
        ROOT_FOLDER.to_string()
    }

    fn parent_folder_identifier_of_identifier(&self, _identifier: &str) -> String {
        ROOT_FOLDER.to_string()
    }

    async fn public_url(&self, identifier: &str) -> Result<String> {
        self.asset(identifier)?.thumbnail(DERIVATIVE_WEB_IMAGE).await
    }

    fn create_folder(&self, _name: &str, _parent: &str, _recursive: bool) -> Result<String> {
        Err(BynderError::NotImplemented("create_folder"))
    }

    fn rename_folder(&self, _identifier: &str, _new_name: &str) -> Result<HashMap<String, String>> {
        Err(BynderError::NotImplemented("rename_folder"))
    }

    fn delete_folder(&self, _identifier: &str, _recursive: bool) -> Result<bool> {
        Err(BynderError::NotImplemented("delete_folder"))
    }

    fn file_exists(&self, identifier: &str) -> bool {
        !identifier.is_empty()
    }

    fn folder_exists(&self, identifier: &str) -> bool {
        identifier == ROOT_FOLDER
    }

    fn is_folder_empty(&self, identifier: &str) -> bool {
        !self.folder_exists(identifier)
    }

    fn add_file(&self, _local_path: &Path, _target_folder: &str, _new_name: &str, _remove_original: bool) -> Result<String> {
        Err(BynderError::NotImplemented("add_file"))
    }

    fn create_file(&self, _name: &str, _parent: &str) -> Result<String> {
        Err(BynderError::NotImplemented("create_file"))
    }

    fn copy_file_within_storage(&self, _identifier: &str, _target_folder: &str, _name: &str) -> Result<String> {
        Err(BynderError::NotImplemented("copy_file_within_storage"))
    }

    fn rename_file(&self, _identifier: &str, _new_name: &str) -> Result<String> {
        Err(BynderError::NotImplemented("rename_file"))
    }

    fn replace_file(&self, _identifier: &str, _local_path: &Path) -> Result<bool> {
        Err(BynderError::NotImplemented("replace_file"))
    }

    fn delete_file(&self, identifier: &str) -> Result<bool> {
        // Processed files are CDN links; there is nothing to delete
        if VirtualPath::parse(identifier).is_processed() {
            debug!(identifier, "Ignoring delete of processed file");
            return Ok(true);
        }
        Err(BynderError::NotImplemented("delete_file"))
    }

    fn hash(&self, identifier: &str, algorithm: &str) -> Result<String> {
        Ok(match algorithm.parse::<HashAlgorithm>()? {
            HashAlgorithm::Sha1 => hex::encode(Sha1::digest(identifier.as_bytes())),
            HashAlgorithm::Md5 => hex::encode(Md5::digest(identifier.as_bytes())),
        })
    }

    fn move_file_within_storage(&self, _identifier: &str, _target_folder: &str, _new_name: &str) -> Result<String> {
        Err(BynderError::NotImplemented("move_file_within_storage"))
    }

    fn move_folder_within_storage(&self, _source: &str, _target: &str, _new_name: &str) -> Result<HashMap<String, String>> {
        Err(BynderError::NotImplemented("move_folder_within_storage"))
    }

    fn copy_folder_within_storage(&self, _source: &str, _target: &str, _new_name: &str) -> Result<bool> {
        Err(BynderError::NotImplemented("copy_folder_within_storage"))
    }

    async fn file_contents(&self, identifier: &str) -> Result<Vec<u8>> {
        self.asset(identifier)?.contents(DERIVATIVE_WEB_IMAGE).await
    }

    fn set_file_contents(&self, _identifier: &str, _contents: &[u8]) -> Result<u64> {
        Err(BynderError::NotImplemented("set_file_contents"))
    }

    fn file_exists_in_folder(&self, name: &str, folder: &str) -> bool {
        !name.is_empty() && folder == ROOT_FOLDER
    }

    fn folder_exists_in_folder(&self, _name: &str, _folder: &str) -> bool {
        false
    }

    async fn file_for_local_processing(&self, identifier: &str, _writable: bool) -> Result<PathBuf> {
        self.asset(identifier)?
            .local_thumbnail_path(DERIVATIVE_WEB_IMAGE)
            .await
    }

    fn permissions(&self, identifier: &str) -> Permissions {
        Permissions {
            read: identifier == ROOT_FOLDER || self.file_exists(identifier),
            write: false,
        }
    }

    fn dump_file_contents(&self, _identifier: &str) -> Result<()> {
        Err(BynderError::NotImplemented("dump_file_contents"))
    }

    fn is_within(&self, folder: &str, _identifier: &str) -> bool {
        folder == ROOT_FOLDER
    }

    async fn file_info_by_identifier(&self, identifier: &str, keys: &[String]) -> Result<FileInfo> {
        self.asset(identifier)?.extract_properties(keys).await
    }

    fn folder_info_by_identifier(&self, identifier: &str) -> FolderInfo {
        FolderInfo {
            identifier: identifier.to_string(),
            name: FOLDER_NAME.to_string(),
            mtime: 0,
            ctime: 0,
            storage: self.resolver.context().storage,
        }
    }

    fn file_in_folder(&self, _name: &str, _folder: &str) -> String {
        String::new()
    }

    fn files_in_folder(&self, _folder: &str, _options: &ListOptions) -> Vec<String> {
        Vec::new()
    }

    fn folder_in_folder(&self, _name: &str, _folder: &str) -> String {
        String::new()
    }

    fn folders_in_folder(&self, _folder: &str, _options: &ListOptions) -> Vec<String> {
        Vec::new()
    }

    fn count_files_in_folder(&self, _folder: &str, _recursive: bool) -> usize {
        0
    }

    fn count_folders_in_folder(&self, _folder: &str, _recursive: bool) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssetContext;
    use crate::ids::StorageUid;
    use crate::mock::{MockClient, MockFetcher};
    use crate::scratch::ScratchStore;

    fn driver(client: Arc<MockClient>) -> BynderDriver {
        let root = std::env::temp_dir().join("driver_unit_test");
        let context = AssetContext::new(
            client,
            Arc::new(MockFetcher::new()),
            ScratchStore::new(root.clone(), root),
            StorageUid(3),
        );
        BynderDriver::new(Arc::new(AssetResolver::new(context)))
    }

    #[test]
    fn test_capabilities_after_initialize() {
        let mut driver = driver(Arc::new(MockClient::new()));
        assert!(driver.capabilities().is_empty());

        driver.initialize();
        assert!(driver.has_capability(Capabilities::BROWSABLE | Capabilities::PUBLIC));
        assert!(driver.has_capability(Capabilities::WRITABLE));

        let merged = driver.merge_configuration_capabilities(Capabilities::BROWSABLE | Capabilities::PUBLIC);
        assert_eq!(merged, Capabilities::BROWSABLE | Capabilities::PUBLIC);
        assert!(!driver.has_capability(Capabilities::WRITABLE));
        // All requested bits must be present
        assert!(!driver.has_capability(Capabilities::PUBLIC | Capabilities::WRITABLE));
    }

    #[test]
    fn test_hash() {
        let driver = driver(Arc::new(MockClient::new()));
        assert_eq!(driver.hash("abc", "sha1").unwrap(), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(driver.hash("abc", "md5").unwrap(), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(driver.hash_identifier("abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert!(matches!(
            driver.hash("abc", "sha256"),
            Err(BynderError::UnsupportedHashAlgorithm(algo)) if algo == "sha256"
        ));
    }

    #[test]
    fn test_folder_structure() {
        let driver = driver(Arc::new(MockClient::new()));
        let id = "12345678-abcd-ef01-23456789abcdef01";

        assert_eq!(driver.root_level_folder(), "");
        assert_eq!(driver.default_folder(), "");
        assert_eq!(driver.parent_folder_identifier_of_identifier(id), "");
        assert!(driver.folder_exists(""));
        assert!(!driver.folder_exists(id));
        assert!(!driver.is_folder_empty(""));
        assert!(driver.is_folder_empty("other"));
        assert!(driver.is_within("", id));
        assert!(!driver.is_within(id, id));
        assert!(driver.file_exists(id));
        assert!(!driver.file_exists(""));
        assert!(driver.file_exists_in_folder("Logo.bynder.jpg", ""));
        assert!(!driver.file_exists_in_folder("", ""));
        assert!(!driver.file_exists_in_folder("Logo.bynder.jpg", "sub"));
        assert!(!driver.folder_exists_in_folder("sub", ""));
    }

    #[test]
    fn test_permissions_never_writable() {
        let driver = driver(Arc::new(MockClient::new()));
        assert_eq!(driver.permissions(""), Permissions { read: true, write: false });
        assert_eq!(
            driver.permissions("12345678-abcd-ef01-23456789abcdef01"),
            Permissions { read: true, write: false }
        );
    }

    #[test]
    fn test_listings_are_empty() {
        let driver = driver(Arc::new(MockClient::new()));
        let options = ListOptions::default();
        assert!(driver.files_in_folder("", &options).is_empty());
        assert!(driver.folders_in_folder("", &options).is_empty());
        assert_eq!(driver.file_in_folder("x", ""), "");
        assert_eq!(driver.folder_in_folder("x", ""), "");
        assert_eq!(driver.count_files_in_folder("", true), 0);
        assert_eq!(driver.count_folders_in_folder("", false), 0);
    }

    #[test]
    fn test_mutations_not_implemented() {
        let driver = driver(Arc::new(MockClient::new()));
        let id = "12345678-abcd-ef01-23456789abcdef01";
        let local = Path::new("/tmp/x");

        assert!(matches!(driver.create_folder("a", "", false), Err(BynderError::NotImplemented("create_folder"))));
        assert!(matches!(driver.rename_folder("", "a"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.delete_folder("", true), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.add_file(local, "", "x", true), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.create_file("x", ""), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.copy_file_within_storage(id, "", "x"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.rename_file(id, "x"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.replace_file(id, local), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.delete_file(id), Err(BynderError::NotImplemented("delete_file"))));
        assert!(matches!(driver.move_file_within_storage(id, "", "x"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.move_folder_within_storage("", "", "x"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.copy_folder_within_storage("", "", "x"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.set_file_contents(id, b"x"), Err(BynderError::NotImplemented(_))));
        assert!(matches!(driver.dump_file_contents(id), Err(BynderError::NotImplemented(_))));
    }

    #[test]
    fn test_delete_processed_file_without_remote() {
        let client = Arc::new(MockClient::new());
        let driver = driver(client.clone());
        assert!(driver
            .delete_file("processed_ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456-7_thumbnail")
            .unwrap());
        assert_eq!(client.fetch_count(), 0);
    }

    #[test]
    fn test_folder_info() {
        let driver = driver(Arc::new(MockClient::new()));
        assert_eq!(
            driver.folder_info_by_identifier(""),
            FolderInfo {
                identifier: String::new(),
                name: "Bynder".to_string(),
                mtime: 0,
                ctime: 0,
                storage: StorageUid(3),
            }
        );
    }

    #[test]
    fn test_sanitize_and_case() {
        let driver = driver(Arc::new(MockClient::new()));
        assert_eq!(driver.sanitize_file_name("My File?.jpg"), "My File?.jpg");
        assert!(driver.is_case_sensitive_file_system());
    }
}
