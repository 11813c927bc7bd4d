//! Error taxonomy for the driver and asset layer

/// Errors raised by the asset, resolver, client, and driver layers
#[derive(Debug, thiserror::Error)]
pub enum BynderError {
    /// Asset id does not match the 8-4-4-16 hex shape; never reaches the API
    #[error("Invalid identifier given: {0}")]
    InvalidIdentifier(String),

    /// Network, authentication, or service failure talking to Bynder
    #[error("Bynder API unavailable: {0}")]
    RemoteUnavailable(String),

    /// Neither the requested nor the default derivative exists
    #[error("No thumbnail derivative found for: {0}")]
    NoThumbnail(String),

    /// Fetching or writing the local copy of a derivative failed
    #[error("Thumbnail unavailable: {0}")]
    ThumbnailUnavailable(String),

    #[error("The information \"{0}\" is not available.")]
    UnknownProperty(String),

    /// The driver is read-only; every mutation ends here
    #[error("Method {0}() is not implemented")]
    NotImplemented(&'static str),

    #[error("Hash algorithm {0} is not implemented.")]
    UnsupportedHashAlgorithm(String),

    /// Asset kind unknown, so there is nothing to embed
    #[error("No rendering implemented for asset: {0}")]
    UnsupportedAsset(String),

    /// The picker callback received no usable asset ids
    #[error("No files given/found")]
    NoFilesAttached,

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl From<reqwest::Error> for BynderError {
    fn from(err: reqwest::Error) -> Self {
        BynderError::RemoteUnavailable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BynderError>;
