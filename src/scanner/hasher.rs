//! Content hashing strategies.
//!
//! # Overview
//!
//! The pipeline treats the digest as a replaceable black box behind the
//! [`ContentHasher`] trait: one method turning a path into a hex digest or a
//! [`HashError`]. A strategy is picked once at startup from
//! [`HashAlgorithm`]; there is no fallback from one strategy to another.
//!
//! Both implementations stream the file through a fixed buffer, so memory use
//! does not depend on file size.
//!
//! # Example
//!
//! ```no_run
//! use dirdupes::scanner::{ContentHasher, HashAlgorithm};
//! use std::path::Path;
//!
//! let hasher = HashAlgorithm::Blake3.build();
//! let digest = hasher.hash_file(Path::new("some/file.bin")).unwrap();
//! assert_eq!(digest.len(), 64);
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::HashError;

/// Read buffer size for streaming hashes.
pub const BUFFER_SIZE: usize = 64 * 1024;

/// A strategy that hashes the content of a file.
pub trait ContentHasher: Send + Sync {
    /// Short algorithm name, recorded in the index.
    fn name(&self) -> &'static str;

    /// Hash the whole content of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file cannot be opened or read.
    fn hash_file(&self, path: &Path) -> Result<String, HashError>;
}

/// Available hash algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE3 (fast, default)
    #[default]
    Blake3,
    /// SHA-256
    Sha256,
}

impl HashAlgorithm {
    /// Name stored in the index for this algorithm.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Blake3 => "blake3",
            Self::Sha256 => "sha256",
        }
    }

    /// Build the hashing strategy for this algorithm.
    #[must_use]
    pub fn build(self) -> Arc<dyn ContentHasher> {
        match self {
            Self::Blake3 => Arc::new(Blake3Hasher::new()),
            Self::Sha256 => Arc::new(Sha256Hasher::new()),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// BLAKE3 content hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Blake3Hasher {
    /// Create a new BLAKE3 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ContentHasher for Blake3Hasher {
    fn name(&self) -> &'static str {
        HashAlgorithm::Blake3.name()
    }

    fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let mut hasher = blake3::Hasher::new();
        stream_file(path, |chunk| {
            hasher.update(chunk);
        })?;
        Ok(hasher.finalize().to_hex().to_string())
    }
}

/// SHA-256 content hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    /// Create a new SHA-256 hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ContentHasher for Sha256Hasher {
    fn name(&self) -> &'static str {
        HashAlgorithm::Sha256.name()
    }

    fn hash_file(&self, path: &Path) -> Result<String, HashError> {
        let mut hasher = Sha256::new();
        stream_file(path, |chunk| hasher.update(chunk))?;
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Feed the file at `path` to `sink` in `BUFFER_SIZE` chunks.
fn stream_file<F>(path: &Path, mut sink: F) -> Result<(), HashError>
where
    F: FnMut(&[u8]),
{
    let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::from_io(path, e)),
        };
        sink(&buffer[..read]);
    }
    Ok(())
}
