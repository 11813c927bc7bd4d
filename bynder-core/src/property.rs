//! Filesystem-style property vocabulary of the host storage contract

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BynderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Size,
    Atime,
    Mtime,
    Ctime,
    Mimetype,
    Name,
    Extension,
    Identifier,
    IdentifierHash,
    Storage,
    FolderHash,
    Title,
    Description,
    Width,
    Height,
    Copyright,
    Keywords,
}

impl Property {
    pub const ALL: [Property; 17] = [
        Property::Size,
        Property::Atime,
        Property::Mtime,
        Property::Ctime,
        Property::Mimetype,
        Property::Name,
        Property::Extension,
        Property::Identifier,
        Property::IdentifierHash,
        Property::Storage,
        Property::FolderHash,
        Property::Title,
        Property::Description,
        Property::Width,
        Property::Height,
        Property::Copyright,
        Property::Keywords,
    ];

    /// Keys returned when the host asks for no keys in particular
    pub const DEFAULT: [Property; 11] = [
        Property::Size,
        Property::Atime,
        Property::Mtime,
        Property::Ctime,
        Property::Mimetype,
        Property::Name,
        Property::Extension,
        Property::Identifier,
        Property::IdentifierHash,
        Property::Storage,
        Property::FolderHash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Size => "size",
            Property::Atime => "atime",
            Property::Mtime => "mtime",
            Property::Ctime => "ctime",
            Property::Mimetype => "mimetype",
            Property::Name => "name",
            Property::Extension => "extension",
            Property::Identifier => "identifier",
            Property::IdentifierHash => "identifier_hash",
            Property::Storage => "storage",
            Property::FolderHash => "folder_hash",
            Property::Title => "title",
            Property::Description => "description",
            Property::Width => "width",
            Property::Height => "height",
            Property::Copyright => "copyright",
            Property::Keywords => "keywords",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Property {
    type Err = BynderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Property::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| BynderError::UnknownProperty(s.to_string()))
    }
}

/// Value of one property; metadata that is missing becomes `Null`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Integer(i64),
    Text(String),
    Null,
}

impl PropertyValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Integer(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => f.write_str(s),
            PropertyValue::Null => f.write_str("null"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Option<String>> for PropertyValue {
    fn from(s: Option<String>) -> Self {
        s.map_or(PropertyValue::Null, PropertyValue::Text)
    }
}

impl From<Option<i64>> for PropertyValue {
    fn from(n: Option<i64>) -> Self {
        n.map_or(PropertyValue::Null, PropertyValue::Integer)
    }
}

/// Properties of one file, ordered by key
pub type FileInfo = BTreeMap<Property, PropertyValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip_through_from_str() {
        for property in Property::ALL {
            assert_eq!(property.as_str().parse::<Property>().unwrap(), property);
        }
    }

    #[test]
    fn test_unknown_key() {
        assert!(matches!(
            "colour".parse::<Property>(),
            Err(BynderError::UnknownProperty(key)) if key == "colour"
        ));
    }

    #[test]
    fn test_file_info_serializes_as_flat_object() {
        let mut info = FileInfo::new();
        info.insert(Property::Size, PropertyValue::Integer(10));
        info.insert(Property::Name, PropertyValue::Text("Logo.bynder.jpg".to_string()));
        info.insert(Property::Width, PropertyValue::Null);

        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"size":10,"name":"Logo.bynder.jpg","width":null}"#);
    }
}
