//! Duplicate analysis.
//!
//! This module provides functionality for:
//! - Selective hashing of files whose size is shared (`selective`)
//! - Grouping hashed files into duplicate sets (`groups`)
//! - Aggregating duplicate sets into directory pairs (`pairs`)
//! - Running the whole pipeline (`finder`)

pub mod finder;
pub mod groups;
pub mod pairs;
pub mod selective;

pub use finder::{ExistsFn, FinderConfig, FinderError, PairFinder, Report, RunSummary};
pub use groups::{group_by_hash, size_buckets, DuplicateSet, GroupingStats};
pub use pairs::{
    AggregateStats, DirectoryPair, FilePairMatch, PairAggregate, PairAggregator, RankedPair,
};
pub use selective::{HashConfig, HashStats, SelectiveHasher};
