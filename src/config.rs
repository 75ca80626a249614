//! Layered configuration.
//!
//! Settings are merged from, lowest to highest priority:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. The platform config file (`config.toml` in the dirdupes config dir)
//! 3. A file given with `--config`
//! 4. `DIRDUPES_*` environment variables (e.g. `DIRDUPES_IO_THREADS=4`)
//! 5. Command-line flags, applied by the caller
//!
//! ```toml
//! index = "backups.json"
//! algorithm = "sha256"
//! io_threads = 4
//! head = 20
//! ```

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::scanner::HashAlgorithm;

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "DIRDUPES_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Index file location.
    pub index: PathBuf,
    /// Content hash algorithm.
    pub algorithm: HashAlgorithm,
    /// Hashing threads (1 = sequential).
    pub io_threads: usize,
    /// Default number of pairs printed by `analyze`.
    pub head: Option<usize>,
    /// Cap on file pairs enumerated per duplicate set.
    pub max_pairs_per_set: Option<usize>,
    /// Skip hidden entries while listing.
    pub skip_hidden: bool,
    /// Follow symbolic links while listing.
    pub follow_symlinks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: PathBuf::from("index.json"),
            algorithm: HashAlgorithm::default(),
            io_threads: 1,
            head: None,
            max_pairs_per_set: None,
            skip_hidden: false,
            follow_symlinks: false,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or holds an invalid value.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl Config {
    /// Build the layered provider without extracting it.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        if let Some(path) = Self::default_path() {
            log::trace!("Platform config file: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file,
    /// [`ConfigError::Invalid`] if any layer fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: Config = Self::figment(explicit).extract().map_err(Box::new)?;
        log::debug!("Configuration: {:?}", config);
        Ok(config)
    }

    /// Platform-specific config file path, if a home directory is known.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dirdupes").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
