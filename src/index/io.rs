//! Loading and saving the index file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::record::FileRecord;

/// Current version of the index file format.
pub const INDEX_VERSION: u32 = 1;

/// Errors that can occur while reading or writing an index.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// The index file could not be read or written.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path of the index file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The index content is not a valid record collection.
    #[error("Malformed index {path}: {source}")]
    Malformed {
        /// Path of the index file
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// The same path appears more than once.
    #[error("Duplicate path in index: {0}")]
    DuplicatePath(String),

    /// The index was written by an incompatible version.
    #[error("Unsupported index version: {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Version this build understands
        expected: u32,
    },

    /// The index holds hashes from a different algorithm.
    #[error("Index hashes were computed with {index}, but {selected} was selected; run `clear` first")]
    AlgorithmMismatch {
        /// Algorithm recorded in the index
        index: String,
        /// Algorithm selected for this run
        selected: String,
    },

    /// The index could not be serialized.
    #[error("Failed to serialize index: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The persisted collection of file records for a directory tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    /// Format version.
    pub version: u32,
    /// Name of the hash algorithm used for the stored hashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// When the index was last written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// File records in listing order.
    pub records: Vec<FileRecord>,
}

impl Index {
    /// Create an index from freshly listed records.
    #[must_use]
    pub fn new(records: Vec<FileRecord>, algorithm: Option<String>) -> Self {
        Self {
            version: INDEX_VERSION,
            algorithm,
            updated_at: None,
            records,
        }
    }

    /// Number of records that carry a hash.
    #[must_use]
    pub fn hashed_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_hashed()).count()
    }

    /// Load an index from a JSON file.
    ///
    /// Accepts either the versioned envelope or a bare array of records.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not a valid record collection,
    /// contains duplicate paths, or has an unsupported version.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = fs::read_to_string(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|err| match err {
            IndexError::Malformed { source, .. } => IndexError::Malformed {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse an index from a JSON string.
    ///
    /// # Errors
    ///
    /// See [`Index::load`].
    pub fn from_json(content: &str) -> Result<Self, IndexError> {
        let malformed = |source| IndexError::Malformed {
            path: PathBuf::new(),
            source,
        };

        let value: serde_json::Value = serde_json::from_str(content).map_err(malformed)?;
        let index = if value.is_array() {
            let records: Vec<FileRecord> = serde_json::from_value(value).map_err(malformed)?;
            log::debug!("Loaded bare record list ({} records)", records.len());
            Self::new(records, None)
        } else {
            serde_json::from_value::<Self>(value).map_err(malformed)?
        };

        if index.version != INDEX_VERSION {
            return Err(IndexError::UnsupportedVersion {
                found: index.version,
                expected: INDEX_VERSION,
            });
        }

        let mut seen = HashSet::with_capacity(index.records.len());
        for record in &index.records {
            if !seen.insert(record.path.as_str()) {
                return Err(IndexError::DuplicatePath(record.path.clone()));
            }
        }

        Ok(index)
    }

    /// Save the index, replacing the target atomically.
    ///
    /// The content is written to `<path>.tmp` first and renamed over `path`.
    ///
    /// # Errors
    ///
    /// Fails if serialization or any filesystem operation fails.
    pub fn save(&mut self, path: &Path) -> Result<(), IndexError> {
        self.updated_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(self)?;

        let mut tmp_name = OsString::from(path.as_os_str());
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let io_err = |source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        };
        fs::write(&tmp_path, json).map_err(io_err)?;
        fs::rename(&tmp_path, path).map_err(io_err)?;

        log::debug!(
            "Saved index {} ({} records, {} hashed)",
            path.display(),
            self.records.len(),
            self.hashed_count()
        );
        Ok(())
    }

    /// Make sure stored hashes are comparable with `selected`.
    ///
    /// An index without hashes adopts the selected algorithm. An index whose
    /// hashes came from another algorithm is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::AlgorithmMismatch`] when hashes would be mixed.
    pub fn ensure_algorithm(&mut self, selected: &str) -> Result<(), IndexError> {
        let has_hashes = self.hashed_count() > 0;
        match self.algorithm.as_deref() {
            Some(current) if current != selected && has_hashes => {
                return Err(IndexError::AlgorithmMismatch {
                    index: current.to_string(),
                    selected: selected.to_string(),
                });
            }
            None if has_hashes => {
                log::warn!(
                    "Index does not record its hash algorithm; assuming {}",
                    selected
                );
            }
            _ => {}
        }
        self.algorithm = Some(selected.to_string());
        Ok(())
    }
}
