//! Local copies of remote derivatives
//!
//! Files are keyed by the base name of the derivative URL, so the same URL
//! always maps to the same path: `{site_root}/temp/assets/bynder/{basename}`.
//! Entries are reused until something outside this crate cleans the directory.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct ScratchStore {
    root: PathBuf,
    site_root: PathBuf,
}

impl ScratchStore {
    /// `root` must lie below `site_root` for `relative` paths to be meaningful
    pub fn new(root: PathBuf, site_root: PathBuf) -> Self {
        Self { root, site_root }
    }

    pub fn from_settings(settings: &config::Settings) -> Self {
        Self::new(settings.scratch_dir(), settings.site_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic location for the content behind `url`
    pub fn path_for(&self, url: &str) -> PathBuf {
        self.root.join(file_name_for(url))
    }

    pub async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    /// Write atomically: concurrent writers each use their own temp file and
    /// the last rename wins, so readers never observe a partial file.
    pub async fn store(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(
            ".{}.{}.tmp",
            file_name,
            hex::encode(rand::random::<[u8; 8]>())
        ));

        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, path).await {
            fs::remove_file(&temp_path).await.ok();
            return Err(e);
        }
        Ok(())
    }

    pub async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path).await
    }

    /// Site-root-relative form of `path`, with a leading `/`
    pub fn relative(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.site_root).unwrap_or(path);
        let joined = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .filter(|c| c != "/")
            .collect::<Vec<_>>()
            .join("/");
        format!("/{}", joined)
    }

    /// Remove temp files orphaned by interrupted writes
    pub async fn cleanup_temp_files(&self) -> io::Result<usize> {
        let mut cleaned = 0;

        if !fs::try_exists(&self.root).await? {
            return Ok(0);
        }

        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "tmp") {
                fs::remove_file(&path).await?;
                cleaned += 1;
            }
        }

        Ok(cleaned)
    }
}

/// Base name of the URL path; URLs without one fall back to a digest
fn file_name_for(url: &str) -> String {
    let path = match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let base = path.rsplit('/').next().unwrap_or_default();
    let decoded = urlencoding::decode(base)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| base.to_string());

    if decoded.is_empty() || decoded == "." || decoded == ".." || decoded.contains(['/', '\\']) {
        use sha1::{Digest, Sha1};
        hex::encode(Sha1::digest(url.as_bytes()))
    } else {
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_store() -> ScratchStore {
        let site = env::temp_dir().join(format!("scratch_test_{}", uuid::Uuid::new_v4()));
        ScratchStore::new(site.join("temp/assets/bynder"), site)
    }

    #[test]
    fn test_path_for_uses_url_basename() {
        let store = temp_store();
        let path = store.path_for("https://cdn.example.com/m/abc/webimage-Logo.png?v=2");
        assert_eq!(path, store.root().join("webimage-Logo.png"));
        assert_eq!(
            store.path_for("https://cdn.example.com/m/abc/webimage-Logo.png"),
            path
        );
    }

    #[test]
    fn test_path_for_without_basename() {
        let store = temp_store();
        let path = store.path_for("https://cdn.example.com/");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), 40);
    }

    #[test]
    fn test_relative_has_leading_slash() {
        let store = temp_store();
        let path = store.path_for("https://cdn.example.com/a/b.png");
        assert_eq!(store.relative(&path), "/temp/assets/bynder/b.png");
    }

    #[tokio::test]
    async fn test_store_and_read() {
        let store = temp_store();
        let path = store.path_for("https://cdn.example.com/a/b.png");

        assert!(!store.exists(&path).await);
        store.store(&path, b"png bytes").await.unwrap();
        assert!(store.exists(&path).await);
        assert_eq!(store.read(&path).await.unwrap(), b"png bytes");

        // Overwrite: last writer wins
        store.store(&path, b"newer").await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), b"newer");
        assert_eq!(store.cleanup_temp_files().await.unwrap(), 0);

        fs::remove_dir_all(&store.site_root).await.ok();
    }

    #[tokio::test]
    async fn test_cleanup_temp_files() {
        let store = temp_store();
        fs::create_dir_all(store.root()).await.unwrap();
        fs::write(store.root().join(".b.png.0011.tmp"), b"partial").await.unwrap();
        fs::write(store.root().join("b.png"), b"done").await.unwrap();

        assert_eq!(store.cleanup_temp_files().await.unwrap(), 1);
        assert!(store.exists(&store.root().join("b.png")).await);

        fs::remove_dir_all(&store.site_root).await.ok();
    }

    #[tokio::test]
    async fn test_cleanup_missing_root() {
        assert_eq!(temp_store().cleanup_temp_files().await.unwrap(), 0);
    }
}
