//! Selective hashing of index records.
//!
//! # Overview
//!
//! Hashing is the dominant cost of the pipeline, so only records that can
//! possibly have a duplicate are hashed: a record is a candidate iff at
//! least one other record has the same size. Records with a unique size are
//! left without a hash.
//!
//! Candidates that already carry a hash are never hashed again, which makes
//! a second run over the same index a no-op and lets an interrupted run
//! resume from the saved index.
//!
//! Pending candidates are processed largest first so byte-based progress
//! moves steadily; the order has no effect on the resulting hashes.
//!
//! # Example
//!
//! ```no_run
//! use dirdupes::duplicates::{HashConfig, SelectiveHasher};
//! use dirdupes::index::FileRecord;
//! use dirdupes::scanner::HashAlgorithm;
//!
//! let mut records = vec![
//!     FileRecord::new("a/x.bin", 100),
//!     FileRecord::new("b/x.bin", 100),
//!     FileRecord::new("c/z.bin", 50),
//! ];
//!
//! let hasher = SelectiveHasher::new(HashAlgorithm::Blake3.build(), HashConfig::default());
//! let stats = hasher.hash_records(&mut records);
//!
//! assert_eq!(stats.candidates, 2);
//! assert_eq!(stats.skipped_unique, 1);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::groups::size_buckets;
use crate::index::FileRecord;
use crate::progress::ProgressCallback;
use crate::scanner::{ContentHasher, HashError};

/// Configuration for the selective hasher.
#[derive(Clone)]
pub struct HashConfig {
    /// Number of I/O threads. 1 hashes sequentially on the caller's thread.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HashConfig {
    /// Set the number of I/O threads.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
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
}

/// Statistics from a hashing pass.
#[derive(Debug, Default)]
pub struct HashStats {
    /// Records whose size is shared with at least one other record
    pub candidates: usize,
    /// Records skipped because their size is unique
    pub skipped_unique: usize,
    /// Candidates that already carried a hash
    pub already_hashed: usize,
    /// Candidates hashed in this pass
    pub newly_hashed: usize,
    /// Candidates that failed to hash
    pub failed: usize,
    /// Candidates left unhashed because of a shutdown request
    pub not_attempted: usize,
    /// Bytes read for newly hashed records
    pub bytes_hashed: u64,
    /// Errors encountered, in processing order
    pub errors: Vec<HashError>,
    /// Whether the pass was interrupted by shutdown
    pub interrupted: bool,
}

enum Outcome {
    Hashed(u64),
    Failed(HashError),
    Skipped,
}

/// Hashes the records that can possibly have a content duplicate.
pub struct SelectiveHasher {
    hasher: Arc<dyn ContentHasher>,
    config: HashConfig,
}

impl SelectiveHasher {
    /// Create a selective hasher using the given hashing strategy.
    #[must_use]
    pub fn new(hasher: Arc<dyn ContentHasher>, config: HashConfig) -> Self {
        Self { hasher, config }
    }

    /// Name of the underlying hash algorithm.
    #[must_use]
    pub fn algorithm(&self) -> &'static str {
        self.hasher.name()
    }

    /// Fill in `hash` for every unhashed candidate record.
    ///
    /// A hashing failure leaves the record unhashed, is logged and recorded
    /// in the returned stats; it never stops the pass.
    pub fn hash_records(&self, records: &mut [FileRecord]) -> HashStats {
        let buckets = size_buckets(records);
        let mut stats = HashStats::default();

        let mut pending: Vec<&mut FileRecord> = Vec::new();
        for record in records.iter_mut() {
            if buckets.get(&record.size).copied().unwrap_or(0) < 2 {
                stats.skipped_unique += 1;
                log::trace!("Unique size {}: {}", record.size, record.path);
                continue;
            }
            stats.candidates += 1;
            if record.is_hashed() {
                stats.already_hashed += 1;
            } else {
                pending.push(record);
            }
        }

        // Stable: equal sizes keep input order.
        pending.sort_by(|a, b| b.size.cmp(&a.size));

        let total_bytes: u64 = pending.iter().map(|r| r.size).sum();
        log::info!(
            "Hashing {} of {} candidate files ({} bytes, {} already hashed, {} unique sizes skipped)",
            pending.len(),
            stats.candidates,
            total_bytes,
            stats.already_hashed,
            stats.skipped_unique
        );

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", total_bytes);
        }

        let outcomes: Vec<Outcome> = if self.config.io_threads > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.io_threads)
                .build()
            {
                Ok(pool) => pool.install(|| {
                    pending
                        .par_iter_mut()
                        .enumerate()
                        .map(|(idx, record)| self.hash_one(idx, record))
                        .collect()
                }),
                Err(e) => {
                    log::warn!("Failed to create hashing thread pool, hashing sequentially: {e}");
                    self.hash_sequential(&mut pending)
                }
            }
        } else {
            self.hash_sequential(&mut pending)
        };

        for outcome in outcomes {
            match outcome {
                Outcome::Hashed(bytes) => {
                    stats.newly_hashed += 1;
                    stats.bytes_hashed = stats.bytes_hashed.saturating_add(bytes);
                }
                Outcome::Failed(err) => {
                    stats.failed += 1;
                    stats.errors.push(err);
                }
                Outcome::Skipped => stats.not_attempted += 1,
            }
        }

        if self.config.is_shutdown_requested() {
            stats.interrupted = true;
            log::info!(
                "Hashing interrupted, {} candidates left for a later run",
                stats.not_attempted
            );
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        log::info!(
            "{} files skipped (only 1 file with that size), {} files hashed, {} failed",
            stats.skipped_unique,
            stats.newly_hashed,
            stats.failed
        );

        stats
    }

    fn hash_sequential(&self, pending: &mut [&mut FileRecord]) -> Vec<Outcome> {
        pending
            .iter_mut()
            .enumerate()
            .map(|(idx, record)| self.hash_one(idx, record))
            .collect()
    }

    fn hash_one(&self, idx: usize, record: &mut FileRecord) -> Outcome {
        if self.config.is_shutdown_requested() {
            return Outcome::Skipped;
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(idx + 1, &record.path);
        }

        let outcome = match self.hasher.hash_file(record.as_path()) {
            Ok(hash) => {
                log::trace!("Hashed {}: {}", record.path, hash);
                record.hash = Some(hash);
                Outcome::Hashed(record.size)
            }
            Err(err) => {
                log::warn!("Failed to hash {}: {}", record.path, err);
                Outcome::Failed(err)
            }
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_item_completed(record.size);
        }

        outcome
    }
}
