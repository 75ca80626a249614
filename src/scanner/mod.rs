//! Scanner module for directory listing and file hashing.
//!
//! This module provides functionality for:
//! - Sorted, depth-first directory listing into [`FileRecord`]s
//! - Content hashing behind the [`ContentHasher`] trait
//! - Unicode and separator normalization of record paths
//!
//! # Architecture
//!
//! - [`walker`]: Directory traversal and record creation
//! - [`hasher`]: BLAKE3 / SHA-256 streaming hashers
//! - [`path_utils`]: Path normalization and `dirname`
//!
//! # Example
//!
//! ```no_run
//! use dirdupes::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let config = WalkerConfig {
//!     extension: Some("jpg".to_string()),
//!     ..Default::default()
//! };
//!
//! let (records, errors) = Walker::new(Path::new("."), config).walk().unwrap();
//! for record in &records {
//!     println!("{}: {} bytes", record.path, record.size);
//! }
//! for error in &errors {
//!     eprintln!("Warning: {}", error);
//! }
//! ```
//!
//! [`FileRecord`]: crate::index::FileRecord

pub mod hasher;
pub mod path_utils;
pub mod walker;

use std::path::{Path, PathBuf};

pub use hasher::{Blake3Hasher, ContentHasher, HashAlgorithm, Sha256Hasher};
pub use walker::Walker;

/// Configuration for directory listing.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Only list files with this extension (without the leading dot).
    pub extension: Option<String>,

    /// Follow symbolic links during traversal.
    /// Warning: May cause infinite loops with symlink cycles.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,
}

/// Errors that can occur during directory listing.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The file name is not valid UTF-8 and cannot be stored in the index.
    #[error("Path is not valid UTF-8: {0}")]
    InvalidUtf8(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while hashing `path`.
    #[must_use]
    pub fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
