//! Validated identifier newtypes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BynderError;

/// Segment lengths of a Bynder media id: `xxxxxxxx-xxxx-xxxx-xxxxxxxxxxxxxxxx`
const SEGMENTS: [usize; 4] = [8, 4, 4, 16];

/// Identifier of a remote Bynder asset
///
/// Always matches the 8-4-4-16 hex shape (case-insensitive). The original
/// casing is kept, since the API and CDN URLs echo it back.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetIdentifier(String);

impl AssetIdentifier {
    /// Validate and wrap an identifier
    pub fn new(s: impl Into<String>) -> Result<Self, BynderError> {
        let s = s.into();
        if Self::is_valid(&s) {
            Ok(Self(s))
        } else {
            Err(BynderError::InvalidIdentifier(s))
        }
    }

    /// Check the shape without constructing
    pub fn is_valid(s: &str) -> bool {
        let mut parts = s.split('-');
        for len in SEGMENTS {
            match parts.next() {
                Some(part) if part.len() == len && part.bytes().all(|b| b.is_ascii_hexdigit()) => {}
                _ => return false,
            }
        }
        parts.next().is_none()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AssetIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AssetIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AssetIdentifier {
    type Err = BynderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AssetIdentifier {
    type Error = BynderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<AssetIdentifier> for String {
    fn from(id: AssetIdentifier) -> String {
        id.0
    }
}

/// Uid of the host storage record the driver is mounted as
///
/// Injected into the asset layer instead of being looked up from session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageUid(pub u32);

impl fmt::Display for StorageUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
