use directories::BaseDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

static DATA_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

pub struct PathManager;

impl PathManager {
    /// Set a custom data directory (embedded hosts that manage their own layout)
    pub fn set_data_dir(path: PathBuf) {
        let _ = DATA_DIR_OVERRIDE.set(path);
    }

    fn base_data_dir() -> Option<PathBuf> {
        if let Some(d) = DATA_DIR_OVERRIDE.get() {
            return Some(d.clone());
        }
        BaseDirs::new().map(|d| d.data_dir().join("bynder"))
    }

    pub fn data_dir() -> Option<PathBuf> {
        Self::base_data_dir()
    }

    pub fn config_dir() -> Option<PathBuf> {
        if let Some(d) = DATA_DIR_OVERRIDE.get() {
            return Some(d.clone());
        }
        BaseDirs::new().map(|d| d.config_dir().join("bynder"))
    }

    /// Default site root; materialized thumbnails live below it
    pub fn cache_dir() -> Option<PathBuf> {
        if let Some(d) = DATA_DIR_OVERRIDE.get() {
            return Some(d.join("cache"));
        }
        BaseDirs::new().map(|d| d.cache_dir().join("bynder"))
    }

    pub fn logs_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(dirs) = directories::UserDirs::new() {
                return Some(dirs.home_dir().join("Library/Logs/Bynder"));
            }
        }
        Self::data_dir().map(|d| d.join("logs"))
    }

    pub fn log_file_path() -> Option<PathBuf> {
        Self::logs_dir().map(|d| d.join("bynder.log"))
    }

    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("bynder.toml"))
    }

    pub fn ensure_dirs_exist() -> std::io::Result<()> {
        if let Some(d) = Self::config_dir() {
            std::fs::create_dir_all(&d)?;
        }
        if let Some(d) = Self::logs_dir() {
            std::fs::create_dir_all(&d)?;
        }
        if let Some(d) = Self::cache_dir() {
            std::fs::create_dir_all(&d)?;
        }
        Ok(())
    }
}
