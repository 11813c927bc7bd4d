//! Bynder integration settings
//!
//! Settings are read once at process start from `bynder.toml` in the config
//! directory, overlaid with `BYNDER_*` environment variables, and validated
//! before any remote operation is attempted.

use crate::{crypto, ConfigError, PathManager};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_UNAVAILABLE_IMAGE: &str = "Resources/Public/Icons/ImageUnavailable.svg";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variables that override values from the settings file
const ENV_OVERRIDES: [(&str, Field); 6] = [
    ("BYNDER_URL", Field::Url),
    ("BYNDER_OTF_BASE_URL", Field::OnTheFlyBaseUrl),
    ("BYNDER_CONSUMER_KEY", Field::ConsumerKey),
    ("BYNDER_CONSUMER_SECRET", Field::ConsumerSecret),
    ("BYNDER_TOKEN_KEY", Field::TokenKey),
    ("BYNDER_TOKEN_SECRET", Field::TokenSecret),
];

#[derive(Clone, Copy)]
enum Field {
    Url,
    OnTheFlyBaseUrl,
    ConsumerKey,
    ConsumerSecret,
    TokenKey,
    TokenSecret,
}

/// Settings stored in bynder.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Bynder portal URL, e.g. "https://example.getbynder.com/"
    #[serde(default)]
    pub url: String,
    /// Base URL of the on-the-fly image resizing endpoint (optional feature)
    #[serde(default)]
    pub otf_base_url: Option<String>,
    #[serde(default)]
    pub consumer_key: String,
    /// Plain or `enc:`-prefixed consumer secret
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub token_key: String,
    /// Plain or `enc:`-prefixed token secret
    #[serde(default)]
    pub token_secret: String,
    /// Image shown when an asset has no usable thumbnail
    #[serde(default)]
    pub image_unavailable: Option<String>,
    #[serde(default)]
    pub asset_types: AssetTypeExtensions,
    /// Uid of the host storage record this driver is mounted as
    #[serde(default = "default_storage_uid")]
    pub storage_uid: u32,
    /// Root that relative paths of materialized files are computed against
    #[serde(default)]
    pub site_root: Option<PathBuf>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_storage_uid() -> u32 {
    1
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: String::new(),
            otf_base_url: None,
            consumer_key: String::new(),
            consumer_secret: String::new(),
            token_key: String::new(),
            token_secret: String::new(),
            image_unavailable: None,
            asset_types: AssetTypeExtensions::default(),
            storage_uid: default_storage_uid(),
            site_root: None,
            request_timeout_secs: None,
        }
    }
}

/// Allowed file extensions per asset kind, comma separated
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetTypeExtensions {
    pub image: String,
    pub video: String,
    pub audio: String,
    pub document: String,
}

impl Default for AssetTypeExtensions {
    fn default() -> Self {
        Self {
            image: "jpg,png,gif".to_string(),
            video: "mp4,mov".to_string(),
            audio: "mp3,wav".to_string(),
            document: "pdf, doc, docx".to_string(),
        }
    }
}

impl AssetTypeExtensions {
    /// (kind, extension list) pairs in precedence order
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("image", self.image.as_str()),
            ("video", self.video.as_str()),
            ("audio", self.audio.as_str()),
            ("document", self.document.as_str()),
        ]
    }
}

/// OAuth 1.0a credential quadruple with secrets already decrypted
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("token", &self.token)
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

impl Settings {
    /// Load settings from the default settings file plus environment overrides.
    ///
    /// A missing settings file is not an error on its own; validation fails
    /// afterwards if the environment does not supply the credentials either.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::load_unvalidated()?;
        settings.validate()?;
        Ok(settings)
    }

    /// File plus environment, without the credential check
    pub fn load_unvalidated() -> Result<Self, ConfigError> {
        let mut settings = Self::load_file()?;
        settings.apply_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// The settings file alone, or defaults when there is none; for editing
    pub fn load_file() -> Result<Self, ConfigError> {
        let path = PathManager::settings_path().ok_or(ConfigError::NoPath("settings"))?;
        if path.exists() {
            Self::read(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate settings from a specific file, ignoring the environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Self::read(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save settings to the default settings file
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = PathManager::settings_path().ok_or(ConfigError::NoPath("settings"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(write_err)?;
        Ok(())
    }

    /// Overlay non-empty values returned by `lookup` for the `BYNDER_*` keys
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (key, field) in ENV_OVERRIDES {
            let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            match field {
                Field::Url => self.url = value,
                Field::OnTheFlyBaseUrl => self.otf_base_url = Some(value),
                Field::ConsumerKey => self.consumer_key = value,
                Field::ConsumerSecret => self.consumer_secret = value,
                Field::TokenKey => self.token_key = value,
                Field::TokenSecret => self.token_secret = value,
            }
        }
    }

    /// Every remote operation needs the URL and all four OAuth fields.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<&'static str> = [
            ("url", &self.url),
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("token_key", &self.token_key),
            ("token_secret", &self.token_secret),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingCredentials(missing))
        }
    }

    /// Credentials with encrypted secrets resolved
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.validate()?;
        let secret = |field: &'static str, value: &str| {
            crypto::unseal(value).map_err(|message| ConfigError::Secret { field, message })
        };
        Ok(Credentials {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: secret("consumer_secret", &self.consumer_secret)?,
            token: self.token_key.clone(),
            token_secret: secret("token_secret", &self.token_secret)?,
        })
    }

    /// Store the consumer secret encrypted
    pub fn set_consumer_secret(&mut self, secret: &str) -> Result<(), ConfigError> {
        self.consumer_secret = crypto::seal(secret).map_err(|message| ConfigError::Secret {
            field: "consumer_secret",
            message,
        })?;
        Ok(())
    }

    /// Store the token secret encrypted
    pub fn set_token_secret(&mut self, secret: &str) -> Result<(), ConfigError> {
        self.token_secret = crypto::seal(secret).map_err(|message| ConfigError::Secret {
            field: "token_secret",
            message,
        })?;
        Ok(())
    }

    pub fn api_base_url(&self) -> String {
        clean_url(&self.url)
    }

    /// On-the-fly base URL, `None` when the feature is not configured
    pub fn on_the_fly_base_url(&self) -> Option<String> {
        self.otf_base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(clean_url)
    }

    pub fn unavailable_image(&self) -> &str {
        self.image_unavailable
            .as_deref()
            .unwrap_or(DEFAULT_UNAVAILABLE_IMAGE)
    }

    pub fn site_root(&self) -> PathBuf {
        self.site_root
            .clone()
            .or_else(PathManager::cache_dir)
            .unwrap_or_else(|| std::env::temp_dir().join("bynder"))
    }

    /// Directory holding local copies of remote derivatives
    pub fn scratch_dir(&self) -> PathBuf {
        self.site_root().join("temp").join("assets").join("bynder")
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }
}

/// Normalize a configured URL.
///
/// Adds an `https://` scheme when none is given and makes sure a URL with a
/// path ends with exactly one slash.
pub fn clean_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let url = if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };

    let has_path = url
        .split_once("://")
        .and_then(|(_, rest)| rest.find('/'))
        .is_some();

    if has_path {
        format!("{}/", url.trim_end_matches('/'))
    } else {
        url
    }
}
