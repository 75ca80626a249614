//! File records held in the index.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single file known to the index.
///
/// Created by the walker with `path` and `size` only. The `hash` field is
/// filled in place by the selective hasher and kept across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// File path with forward-slash separators
    pub path: String,
    /// File size in bytes at listing time
    pub size: u64,
    /// Content hash as lowercase hex, if computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl FileRecord {
    /// Create an unhashed record.
    #[must_use]
    pub fn new(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            hash: None,
        }
    }

    /// Create a record that already carries a hash.
    #[must_use]
    pub fn with_hash(path: impl Into<String>, size: u64, hash: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size,
            hash: Some(hash.into()),
        }
    }

    /// Whether a hash has been computed for this record.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.hash.is_some()
    }

    /// The record path as a filesystem path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.path)
    }
}

/// Result of dropping records whose file vanished since the listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Records before pruning
    pub total: usize,
    /// Records removed because their path no longer exists
    pub removed: usize,
}

/// Remove records whose path no longer exists.
///
/// `exists` is the existence check; pass `|p| p.exists()` for the real
/// filesystem. Order of the remaining records is preserved.
pub fn prune_missing<F>(records: &mut Vec<FileRecord>, exists: F) -> PruneStats
where
    F: Fn(&Path) -> bool,
{
    let total = records.len();
    records.retain(|record| {
        let keep = exists(record.as_path());
        if !keep {
            log::debug!("No longer available: {}", record.path);
        }
        keep
    });

    let stats = PruneStats {
        total,
        removed: total - records.len(),
    };

    if stats.removed > 0 {
        log::warn!(
            "{}/{} files no longer available, skipped",
            stats.removed,
            stats.total
        );
    }

    stats
}

/// Drop every computed hash.
///
/// Returns the number of records that had a hash.
pub fn clear_hashes(records: &mut [FileRecord]) -> usize {
    records
        .iter_mut()
        .filter_map(|record| record.hash.take())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_new_is_unhashed() {
        let record = FileRecord::new("a/x.txt", 10);
        assert_eq!(record.path, "a/x.txt");
        assert_eq!(record.size, 10);
        assert!(!record.is_hashed());
    }

    #[test]
    fn test_prune_missing_keeps_order() {
        let mut records = vec![
            FileRecord::new("a/1", 1),
            FileRecord::new("gone/2", 2),
            FileRecord::new("a/3", 3),
        ];

        let stats = prune_missing(&mut records, |p| !p.starts_with("gone"));

        assert_eq!(stats, PruneStats { total: 3, removed: 1 });
        let paths: Vec<_> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a/1", "a/3"]);
    }

    #[test]
    fn test_prune_missing_nothing_removed() {
        let mut records = vec![FileRecord::new("a/1", 1)];
        let stats = prune_missing(&mut records, |_| true);
        assert_eq!(stats.removed, 0);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_clear_hashes() {
        let mut records = vec![
            FileRecord::with_hash("a", 1, "h1"),
            FileRecord::new("b", 1),
            FileRecord::with_hash("c", 2, "h2"),
        ];

        assert_eq!(clear_hashes(&mut records), 2);
        assert!(records.iter().all(|r| !r.is_hashed()));
    }

    #[test]
    fn test_hash_omitted_when_absent() {
        let json = serde_json::to_string(&FileRecord::new("a", 5)).unwrap();
        assert_eq!(json, r#"{"path":"a","size":5}"#);
    }
}
