//! Directory-pair finder: the full analysis pipeline.
//!
//! # Overview
//!
//! [`PairFinder::find_pairs`] runs the pipeline over an index's records:
//!
//! 1. **Prune** - drop records whose file no longer exists
//! 2. **Hash** - hash every record sharing its size with another record
//!    (see [`crate::duplicates::selective`])
//! 3. **Group** - collect paths by content hash
//!    (see [`crate::duplicates::groups`])
//! 4. **Aggregate** - sum duplicated bytes per directory pair
//!    (see [`crate::duplicates::pairs`])
//! 5. **Rank** - sort directory pairs by duplicated bytes
//!
//! Records are updated in place, so the caller can save newly computed
//! hashes back to the index.
//!
//! # Example
//!
//! ```no_run
//! use dirdupes::duplicates::{FinderConfig, PairFinder};
//! use dirdupes::index::Index;
//! use std::path::Path;
//!
//! let mut index = Index::load(Path::new("index.json")).unwrap();
//! let finder = PairFinder::new(FinderConfig::default().with_head(Some(10)));
//! let report = finder.find_pairs(&mut index.records).unwrap();
//!
//! for ranked in &report.pairs {
//!     println!("{} {}", ranked.pair, ranked.total_size);
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Serialize, Serializer};

use super::groups::group_by_hash;
use super::pairs::{PairAggregator, RankedPair};
use super::selective::{HashConfig, HashStats, SelectiveHasher};
use crate::index::{prune_missing, FileRecord};
use crate::progress::ProgressCallback;
use crate::scanner::{ContentHasher, HashAlgorithm, HashError};

/// Existence check used when pruning records.
pub type ExistsFn = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Configuration for the pair finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Keep only the top `n` directory pairs
    pub head: Option<usize>,
    /// Include matching file pairs in the report
    pub details: bool,
    /// Number of I/O threads for hashing (1 = sequential)
    pub io_threads: usize,
    /// Cap on path pairs enumerated per duplicate set
    pub max_pairs_per_set: Option<usize>,
    /// Hash unhashed candidates before grouping
    pub hash_missing: bool,
    /// Existence check for pruning
    pub exists: ExistsFn,
    /// Content hashing strategy
    pub hasher: Arc<dyn ContentHasher>,
    /// Optional shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("head", &self.head)
            .field("details", &self.details)
            .field("io_threads", &self.io_threads)
            .field("max_pairs_per_set", &self.max_pairs_per_set)
            .field("hash_missing", &self.hash_missing)
            .field("hasher", &self.hasher.name())
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish_non_exhaustive()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            head: None,
            details: false,
            io_threads: 1,
            max_pairs_per_set: None,
            hash_missing: true,
            exists: Arc::new(|path: &Path| path.exists()),
            hasher: HashAlgorithm::default().build(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Keep only the top `n` pairs.
    #[must_use]
    pub fn with_head(mut self, head: Option<usize>) -> Self {
        self.head = head;
        self
    }

    /// Include matching file pairs in the report.
    #[must_use]
    pub fn with_details(mut self, details: bool) -> Self {
        self.details = details;
        self
    }

    /// Set the number of I/O threads used for hashing.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Cap the path pairs enumerated per duplicate set.
    #[must_use]
    pub fn with_max_pairs_per_set(mut self, cap: Option<usize>) -> Self {
        self.max_pairs_per_set = cap;
        self
    }

    /// Enable or disable hashing of unhashed candidates.
    #[must_use]
    pub fn with_hash_missing(mut self, enabled: bool) -> Self {
        self.hash_missing = enabled;
        self
    }

    /// Replace the existence check used for pruning.
    #[must_use]
    pub fn with_exists<F>(mut self, exists: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.exists = Arc::new(exists);
        self
    }

    /// Set the content hashing strategy.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Arc<dyn ContentHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn hash_config(&self) -> HashConfig {
        let mut config = HashConfig::default().with_io_threads(self.io_threads);
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(callback.clone());
        }
        config
    }
}

/// Summary of one analysis run. Always produced, even with no pairs.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    /// Hash algorithm in use
    pub algorithm: String,
    /// Records in the index before pruning
    pub total_records: usize,
    /// Records excluded because their file no longer exists
    pub missing: usize,
    /// Records sharing their size with another record
    pub candidates: usize,
    /// Records skipped because their size is unique
    pub skipped_unique: usize,
    /// Candidates hashed by an earlier run
    pub already_hashed: usize,
    /// Candidates hashed in this run
    pub newly_hashed: usize,
    /// Candidates that failed to hash
    pub hash_failures: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Duplicate sets found
    pub duplicate_sets: usize,
    /// Files belonging to a duplicate set
    pub duplicated_files: usize,
    /// Records sharing a hash but not a size
    pub size_conflicts: usize,
    /// Distinct directory pairs before `head`
    pub directory_pairs: usize,
    /// File pairs skipped by the per-set cap
    pub truncated_pairs: usize,
    /// Wall-clock time of the run
    #[serde(rename = "duration_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
    /// Whether hashing stopped early on a shutdown request
    pub interrupted: bool,
    /// Hashing errors in processing order
    #[serde(skip)]
    pub hash_errors: Vec<HashError>,
}

impl RunSummary {
    fn absorb_hash_stats(&mut self, stats: HashStats) {
        self.candidates = stats.candidates;
        self.skipped_unique = stats.skipped_unique;
        self.already_hashed = stats.already_hashed;
        self.newly_hashed = stats.newly_hashed;
        self.hash_failures = stats.failed;
        self.bytes_hashed = stats.bytes_hashed;
        self.interrupted = stats.interrupted;
        self.hash_errors = stats.errors;
    }

    /// Whether some files could not be hashed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.hash_failures > 0
    }
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Result of an analysis run.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Ranked directory pairs
    pub pairs: Vec<RankedPair>,
    /// Run statistics
    pub summary: RunSummary,
}

/// Errors that can occur while finding pairs.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Shutdown was requested before any analysis took place.
    #[error("Analysis interrupted by user")]
    Interrupted,
}

/// Runs the prune, hash, group, aggregate and rank pipeline.
#[derive(Debug)]
pub struct PairFinder {
    config: FinderConfig,
}

impl PairFinder {
    /// Create a new pair finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new pair finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Run the pipeline over `records`.
    ///
    /// Missing files are removed from `records` and newly computed hashes
    /// are written into it. A shutdown request during hashing does not fail
    /// the run: the report covers what was hashed and is flagged
    /// `interrupted`.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Interrupted`] if shutdown was requested before
    /// hashing started.
    pub fn find_pairs(&self, records: &mut Vec<FileRecord>) -> Result<Report, FinderError> {
        let start = Instant::now();
        let mut summary = RunSummary {
            algorithm: self.config.hasher.name().to_string(),
            total_records: records.len(),
            ..RunSummary::default()
        };

        let prune = prune_missing(records, self.config.exists.as_ref());
        summary.missing = prune.removed;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if self.config.hash_missing {
            let hasher =
                SelectiveHasher::new(self.config.hasher.clone(), self.config.hash_config());
            summary.absorb_hash_stats(hasher.hash_records(records));
        } else {
            log::info!("Hashing disabled, using hashes already in the index");
        }

        let (sets, grouping) = group_by_hash(records);
        summary.duplicate_sets = sets.len();
        summary.duplicated_files = grouping.duplicated_files;
        summary.size_conflicts = grouping.size_conflicts;

        let aggregator = PairAggregator::aggregate(&sets, self.config.max_pairs_per_set);
        summary.directory_pairs = aggregator.len();
        summary.truncated_pairs = aggregator.stats().truncated_pairs;

        let pairs = aggregator.rank(self.config.head, self.config.details);
        summary.duration = start.elapsed();

        log::info!(
            "Found {} directory pairs sharing duplicates ({} reported) in {:.2?}",
            summary.directory_pairs,
            pairs.len(),
            summary.duration
        );

        Ok(Report { pairs, summary })
    }
}
