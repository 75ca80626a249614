//! Size buckets and hash-based duplicate sets.
//!
//! # Overview
//!
//! Two groupings live here:
//!
//! - [`size_buckets`] counts records per size. It only decides which records
//!   are worth hashing; it is never used to decide equality.
//! - [`group_by_hash`] collects every path sharing a content hash into a
//!   [`DuplicateSet`]. Hash equality is the sole duplicate criterion.
//!
//! # Example
//!
//! ```
//! use dirdupes::duplicates::group_by_hash;
//! use dirdupes::index::FileRecord;
//!
//! let records = vec![
//!     FileRecord::with_hash("a/x", 100, "h1"),
//!     FileRecord::with_hash("b/y", 100, "h1"),
//!     FileRecord::new("c/z", 50),
//! ];
//!
//! let (sets, stats) = group_by_hash(&records);
//!
//! assert_eq!(sets.len(), 1);
//! assert_eq!(sets[0].paths, vec!["a/x", "b/y"]);
//! assert_eq!(sets[0].total_size(), 200);
//! assert_eq!(stats.unhashed_records, 1);
//! ```

use serde::Serialize;
use std::collections::HashMap;

use crate::index::FileRecord;

/// Count records per file size.
#[must_use]
pub fn size_buckets(records: &[FileRecord]) -> HashMap<u64, usize> {
    let mut buckets: HashMap<u64, usize> = HashMap::new();
    for record in records {
        *buckets.entry(record.size).or_default() += 1;
    }
    buckets
}

/// All paths sharing one content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSet {
    /// Content hash shared by every path
    pub hash: String,
    /// Size of each file in the set
    pub file_size: u64,
    /// Paths in input record order
    pub paths: Vec<String>,
}

impl DuplicateSet {
    /// Create a set holding a single path.
    #[must_use]
    pub fn new(hash: impl Into<String>, file_size: u64, first_path: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            file_size,
            paths: vec![first_path.into()],
        }
    }

    /// Number of paths in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Whether the set holds an actual duplicate (2+ paths).
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.paths.len() > 1
    }

    /// Bytes occupied by all copies: `file_size × len()`, saturating.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.file_size.saturating_mul(self.paths.len() as u64)
    }

    /// Number of unordered path pairs in this set.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        let n = self.paths.len();
        n * n.saturating_sub(1) / 2
    }
}

/// Statistics from hash grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Records that carried a hash
    pub hashed_records: usize,
    /// Records without a hash (unique size or failed)
    pub unhashed_records: usize,
    /// Distinct hashes seen
    pub distinct_hashes: usize,
    /// Hashes held by a single path, dropped
    pub singletons: usize,
    /// Records whose size differs from the first record with the same hash
    pub size_conflicts: usize,
    /// Files belonging to a returned duplicate set
    pub duplicated_files: usize,
}

/// Group hashed records into duplicate sets.
///
/// Sets come back in order of first appearance of their hash; paths inside
/// a set keep input order. Sets with a single path are dropped.
#[must_use]
pub fn group_by_hash(records: &[FileRecord]) -> (Vec<DuplicateSet>, GroupingStats) {
    let mut stats = GroupingStats::default();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut sets: Vec<DuplicateSet> = Vec::new();

    for record in records {
        let Some(hash) = record.hash.as_deref() else {
            stats.unhashed_records += 1;
            continue;
        };
        stats.hashed_records += 1;

        match positions.get(hash) {
            Some(&idx) => {
                let set = &mut sets[idx];
                if set.file_size != record.size {
                    stats.size_conflicts += 1;
                    log::warn!(
                        "Hash {} shared by files of different sizes: {} ({} bytes) vs {} ({} bytes)",
                        hash,
                        set.paths[0],
                        set.file_size,
                        record.path,
                        record.size
                    );
                }
                set.paths.push(record.path.clone());
            }
            None => {
                positions.insert(hash, sets.len());
                sets.push(DuplicateSet::new(hash, record.size, record.path.clone()));
            }
        }
    }

    stats.distinct_hashes = sets.len();
    sets.retain(|set| {
        if set.has_duplicates() {
            true
        } else {
            log::trace!("No duplicate for {}", set.paths[0]);
            false
        }
    });
    stats.singletons = stats.distinct_hashes - sets.len();
    stats.duplicated_files = sets.iter().map(DuplicateSet::len).sum();

    log::info!(
        "Grouped {} hashed files into {} duplicate sets ({} files)",
        stats.hashed_records,
        sets.len(),
        stats.duplicated_files
    );

    (sets, stats)
}
