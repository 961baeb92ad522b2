//! Storage-type classification of free-text disk descriptions.

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Ssd,
    Hdd,
    Ramfs,
    Tmpfs,
    Zfs,
    Unknown,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Ssd => "SSD",
            StorageType::Hdd => "HDD",
            StorageType::Ramfs => "ramfs",
            StorageType::Tmpfs => "tmpfs",
            StorageType::Zfs => "zfs",
            StorageType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keywords in priority order.
const STORAGE_KEYWORDS: &[(&str, StorageType)] = &[
    ("ssd", StorageType::Ssd),
    ("hdd", StorageType::Hdd),
    ("ramfs", StorageType::Ramfs),
    ("tmpfs", StorageType::Tmpfs),
    ("zfs", StorageType::Zfs),
];

/// What an unrecognized description becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownStoragePolicy {
    #[default]
    Ssd,
    Unknown,
}

impl UnknownStoragePolicy {
    pub fn classify(&self, raw: &str) -> StorageType {
        classify_storage(raw).unwrap_or(match self {
            UnknownStoragePolicy::Ssd => StorageType::Ssd,
            UnknownStoragePolicy::Unknown => StorageType::Unknown,
        })
    }
}

/// Keyword match only; `None` when no keyword is present.
pub fn classify_storage(raw: &str) -> Option<StorageType> {
    let lower = raw.to_lowercase();
    STORAGE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, kind)| *kind)
}

/// Keyword match falling back to SSD.
pub fn parse_storage(raw: &str) -> StorageType {
    UnknownStoragePolicy::Ssd.classify(raw)
}
