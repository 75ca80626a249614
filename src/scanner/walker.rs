//! Directory walker producing index records.
//!
//! # Overview
//!
//! The [`Walker`] lists every regular file below a root directory as a
//! [`FileRecord`] (path and size, no hash). Traversal is sequential and
//! depth-first: inside each directory, files come first, then
//! subdirectories, both sorted by name. The listing order is therefore
//! stable across runs, which keeps the saved index diff-friendly.
//!
//! Unreadable directories are reported and skipped; they never abort the
//! listing.
//!
//! # Example
//!
//! ```no_run
//! use dirdupes::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/backups"), WalkerConfig::default());
//! let (records, errors) = walker.walk().unwrap();
//! println!("{} files, {} errors", records.len(), errors.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::path_utils::{has_extension, to_index_path};
use super::{ScanError, WalkerConfig};
use crate::index::FileRecord;
use crate::progress::ProgressCallback;

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set, the walker stops and returns what it has
    /// listed so far.
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

    fn matches_extension(&self, path: &str) -> bool {
        match self.config.extension.as_deref() {
            Some(ext) => has_extension(path, ext),
            None => true,
        }
    }

    /// List all regular files below the root.
    ///
    /// # Returns
    ///
    /// The records in listing order and the non-fatal errors met on the way.
    ///
    /// # Errors
    ///
    /// Fails only if the root itself does not exist or is not a directory.
    pub fn walk(&self) -> Result<(Vec<FileRecord>, Vec<ScanError>), ScanError> {
        if !self.root.exists() {
            return Err(ScanError::NotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let skip_hidden = self.config.skip_hidden;
        let walker = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by(|a, b| {
                a.file_type()
                    .is_dir()
                    .cmp(&b.file_type().is_dir())
                    .then_with(|| a.file_name().cmp(b.file_name()))
            })
            .into_iter()
            .filter_entry(move |entry| !(skip_hidden && entry.depth() > 0 && is_hidden(entry)));

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("listing", 0);
        }

        let mut records = Vec::new();
        let mut errors = Vec::new();

        for item in walker {
            if self.is_shutdown_requested() {
                log::info!("Listing interrupted after {} files", records.len());
                break;
            }

            let entry = match item {
                Ok(entry) => entry,
                Err(err) => {
                    let error = classify_walk_error(err, &self.root);
                    log::warn!("{}", error);
                    errors.push(error);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                log::trace!("Entering {}", entry.path().display());
                continue;
            }
            if !file_type.is_file() {
                log::debug!("Skipping non-regular entry: {}", entry.path().display());
                continue;
            }

            let Some(path) = to_index_path(entry.path()) else {
                let error = ScanError::InvalidUtf8(entry.path().to_path_buf());
                log::warn!("{}", error);
                errors.push(error);
                continue;
            };
            if !self.matches_extension(&path) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    let error = classify_walk_error(err, &self.root);
                    log::warn!("{}", error);
                    errors.push(error);
                    continue;
                }
            };

            records.push(FileRecord::new(path, size));
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(records.len(), &records[records.len() - 1].path);
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("listing");
        }

        log::info!(
            "Listed {} files under {} ({} errors)",
            records.len(),
            self.root.display(),
            errors.len()
        );

        Ok((records, errors))
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

fn classify_walk_error(err: walkdir::Error, root: &Path) -> ScanError {
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    let kind = err.io_error().map(std::io::Error::kind);
    match kind {
        Some(std::io::ErrorKind::PermissionDenied) => ScanError::PermissionDenied(path),
        Some(std::io::ErrorKind::NotFound) => ScanError::NotFound(path),
        _ => {
            let source = err
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            ScanError::Io { path, source }
        }
    }
}
