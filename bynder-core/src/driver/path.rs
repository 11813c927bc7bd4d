use std::sync::LazyLock;

use regex::Regex;

/// Identifier of the single synthetic folder
pub const ROOT_FOLDER: &str = "";

static PROCESSED_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^processed_([0-9A-Z\-]{35})_([a-z]+)").expect("processed-file pattern is valid")
});

/// Identifier shapes the driver recognizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VirtualPath {
    Root,
    /// Derived file; the asset it belongs to is `asset_id`
    Processed { asset_id: String, variant: String },
    File(String),
}

impl VirtualPath {
    pub fn parse(identifier: &str) -> Self {
        if identifier == ROOT_FOLDER {
            return VirtualPath::Root;
        }
        match PROCESSED_FILE.captures(identifier) {
            Some(caps) => VirtualPath::Processed {
                asset_id: caps[1].to_string(),
                variant: caps[2].to_string(),
            },
            None => VirtualPath::File(identifier.to_string()),
        }
    }

    /// Identifier of the asset behind this path, unwrapping processed files
    pub fn asset_id(&self) -> Option<&str> {
        match self {
            VirtualPath::Root => None,
            VirtualPath::Processed { asset_id, .. } => Some(asset_id),
            VirtualPath::File(id) => Some(id),
        }
    }

    pub fn is_processed(&self) -> bool {
        matches!(self, VirtualPath::Processed { .. })
    }
}

/// Asset id behind `identifier`, which may name a processed file
pub fn unwrap_processed(identifier: &str) -> &str {
    match PROCESSED_FILE.captures(identifier).and_then(|caps| caps.get(1)) {
        Some(m) => &identifier[m.range()],
        None => identifier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shapes() {
        assert_eq!(VirtualPath::parse(""), VirtualPath::Root);
        assert_eq!(
            VirtualPath::parse("12345678-abcd-ef01-23456789abcdef01"),
            VirtualPath::File("12345678-abcd-ef01-23456789abcdef01".to_string())
        );
        assert_eq!(
            VirtualPath::parse("processed_ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456-7_thumbnail"),
            VirtualPath::Processed {
                asset_id: "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456-7".to_string(),
                variant: "thumbnail".to_string(),
            }
        );
    }

    #[test]
    fn test_unwrap_processed() {
        assert_eq!(
            unwrap_processed("processed_ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456-7_thumbnail"),
            "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456-7"
        );
        assert_eq!(
            unwrap_processed("12345678-abcd-ef01-23456789abcdef01"),
            "12345678-abcd-ef01-23456789abcdef01"
        );
    }

    #[test]
    fn test_processed_pattern_needs_uppercase_id() {
        // Lowercase hex is not part of the derived-file naming scheme
        assert!(!VirtualPath::parse("processed_12345678-abcd-ef01-23456789abcdef01_preview").is_processed());
        assert!(!VirtualPath::parse("processed_SHORT_preview").is_processed());
        assert!(VirtualPath::parse("processed_12345678-ABCD-EF01-23456789ABCDEF01_preview").is_processed());
    }
}
