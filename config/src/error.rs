use std::path::PathBuf;

/// Errors raised while loading, validating, or saving settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// One or more of the API URL and the four OAuth fields is empty
    #[error("Make sure all Bynder OAuth settings are set (missing: {})", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("Could not determine {0} path")]
    NoPath(&'static str),

    #[error("Failed to read settings from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Encrypting or decrypting a stored secret failed
    #[error("Secret for '{field}' could not be processed: {message}")]
    Secret { field: &'static str, message: String },
}
