//! Directory-pair aggregation and ranking.
//!
//! # Overview
//!
//! Every duplicate set of N paths contributes its C(N, 2) unordered path
//! pairs. Each path pair is mapped to the pair of parent directories, put in
//! canonical order, and the file size is added to that directory pair's
//! total. Ranking the directory pairs by total shows which two directories
//! share the most duplicated bytes.
//!
//! Enumeration is quadratic in the set size. Sets shared by thousands of
//! paths are rare but possible; [`PairAggregator::new`] takes an optional
//! per-set cap for them.
//!
//! # Example
//!
//! ```
//! use dirdupes::duplicates::{DirectoryPair, DuplicateSet, PairAggregator};
//!
//! let mut set = DuplicateSet::new("h1", 100, "a/x");
//! set.paths.push("b/y".into());
//!
//! let aggregator = PairAggregator::aggregate(&[set], None);
//! let ranked = aggregator.rank(None, false);
//!
//! assert_eq!(ranked[0].pair, DirectoryPair::new("b", "a"));
//! assert_eq!(ranked[0].total_size, 100);
//! assert_eq!(ranked[0].match_count, 1);
//! ```

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::groups::DuplicateSet;
use crate::scanner::path_utils::parent_dir;

/// An unordered pair of directories with `first <= second`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DirectoryPair {
    /// Lexicographically smaller directory
    pub first: String,
    /// Lexicographically larger (or equal) directory
    pub second: String,
}

impl DirectoryPair {
    /// Build the canonical pair; argument order does not matter.
    #[must_use]
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// Pair of the parent directories of two file paths.
    #[must_use]
    pub fn of_paths(path_a: &str, path_b: &str) -> Self {
        Self::new(parent_dir(path_a), parent_dir(path_b))
    }

    /// Whether both files live in the same directory.
    #[must_use]
    pub fn is_same_directory(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for DirectoryPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" <-> \"{}\"", self.first, self.second)
    }
}

/// One matching file pair contributing to a directory pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePairMatch {
    /// Size of each of the two files
    pub size: u64,
    /// Path enumerated first from the duplicate set
    pub first_path: String,
    /// Path enumerated second from the duplicate set
    pub second_path: String,
}

/// Accumulated duplicate content between two directories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairAggregate {
    /// Sum of the sizes of all matching file pairs
    pub total_size: u64,
    /// Matching file pairs in enumeration order
    pub files: Vec<FilePairMatch>,
}

impl PairAggregate {
    fn add(&mut self, size: u64, first_path: &str, second_path: &str) {
        self.total_size = self.total_size.saturating_add(size);
        self.files.push(FilePairMatch {
            size,
            first_path: first_path.to_string(),
            second_path: second_path.to_string(),
        });
    }
}

/// A directory pair in the final ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedPair {
    /// 0-based position in the ranking
    pub rank: usize,
    /// The two directories
    pub pair: DirectoryPair,
    /// Duplicated bytes between them
    pub total_size: u64,
    /// Number of matching file pairs
    pub match_count: usize,
    /// Matching file pairs, present only in detailed reports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FilePairMatch>>,
}

/// Statistics from aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    /// Duplicate sets processed
    pub sets: usize,
    /// File pairs enumerated
    pub file_pairs: usize,
    /// File pairs skipped because of the per-set cap
    pub truncated_pairs: usize,
}

/// Accumulates directory-pair totals from duplicate sets.
#[derive(Debug, Default)]
pub struct PairAggregator {
    max_pairs_per_set: Option<usize>,
    positions: HashMap<DirectoryPair, usize>,
    entries: Vec<(DirectoryPair, PairAggregate)>,
    stats: AggregateStats,
}

impl PairAggregator {
    /// Create an empty aggregator.
    ///
    /// `max_pairs_per_set` caps how many path pairs a single duplicate set
    /// may contribute; `None` enumerates all of them.
    #[must_use]
    pub fn new(max_pairs_per_set: Option<usize>) -> Self {
        Self {
            max_pairs_per_set,
            ..Self::default()
        }
    }

    /// Aggregate all sets, largest total size first.
    #[must_use]
    pub fn aggregate(sets: &[DuplicateSet], max_pairs_per_set: Option<usize>) -> Self {
        let mut ordered: Vec<&DuplicateSet> = sets.iter().collect();
        ordered.sort_by(|a, b| b.total_size().cmp(&a.total_size()));

        let mut aggregator = Self::new(max_pairs_per_set);
        for set in ordered {
            aggregator.add_set(set);
        }

        log::info!(
            "Aggregated {} file pairs into {} directory pairs",
            aggregator.stats.file_pairs,
            aggregator.entries.len()
        );
        aggregator
    }

    /// Add every unordered path pair of one duplicate set.
    pub fn add_set(&mut self, set: &DuplicateSet) {
        if !set.has_duplicates() {
            return;
        }
        self.stats.sets += 1;

        let limit = self.max_pairs_per_set.unwrap_or(usize::MAX);
        let mut enumerated = 0usize;
        let paths = &set.paths;

        'outer: for i in 0..paths.len() {
            for j in (i + 1)..paths.len() {
                if enumerated == limit {
                    break 'outer;
                }
                self.add_pair(set.file_size, &paths[i], &paths[j]);
                enumerated += 1;
            }
        }

        let skipped = set.pair_count() - enumerated;
        if skipped > 0 {
            log::warn!(
                "Hash {} shared by {} files: enumerated {} pairs, skipped {}",
                set.hash,
                set.len(),
                enumerated,
                skipped
            );
            self.stats.truncated_pairs += skipped;
        }
        self.stats.file_pairs += enumerated;
    }

    fn add_pair(&mut self, size: u64, path_a: &str, path_b: &str) {
        let key = DirectoryPair::of_paths(path_a, path_b);
        let idx = match self.positions.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.positions.insert(key.clone(), idx);
                self.entries.push((key, PairAggregate::default()));
                idx
            }
        };
        self.entries[idx].1.add(size, path_a, path_b);
    }

    /// Look up the aggregate for a directory pair.
    #[must_use]
    pub fn get(&self, pair: &DirectoryPair) -> Option<&PairAggregate> {
        self.positions.get(pair).map(|&idx| &self.entries[idx].1)
    }

    /// Number of distinct directory pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no pair has been aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregation statistics so far.
    #[must_use]
    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Rank directory pairs by duplicated bytes, descending.
    ///
    /// Ties keep first-insertion order. `head` keeps the top `n` pairs;
    /// `details` includes the matching file pairs.
    #[must_use]
    pub fn rank(self, head: Option<usize>, details: bool) -> Vec<RankedPair> {
        let mut entries = self.entries;
        entries.sort_by(|(_, a), (_, b)| b.total_size.cmp(&a.total_size));

        entries
            .into_iter()
            .take(head.unwrap_or(usize::MAX))
            .enumerate()
            .map(|(rank, (pair, aggregate))| RankedPair {
                rank,
                pair,
                total_size: aggregate.total_size,
                match_count: aggregate.files.len(),
                files: details.then_some(aggregate.files),
            })
            .collect()
    }
}
