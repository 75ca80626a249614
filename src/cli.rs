//! Command-line interface definitions for dirdupes.
//!
//! Global options (verbosity, color, index location) apply to every
//! subcommand. Options that also exist in the config file are `Option`s
//! here so that an omitted flag falls back to the configured value.
//!
//! # Example
//!
//! ```bash
//! # Build an index of ~/backups and hash every possible duplicate
//! dirdupes prepare ~/backups
//!
//! # Show the ten directory pairs sharing the most bytes
//! dirdupes analyze --head 10
//!
//! # Same, with the matching files listed
//! dirdupes analyze --head 10 --details
//!
//! # Rehash after files changed
//! dirdupes update
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;
use crate::scanner::HashAlgorithm;

/// Find directory pairs that share the most duplicated file content.
///
/// `prepare` lists a directory tree into an index file and hashes every file
/// whose size is shared with another file. `analyze` groups identical files
/// and ranks pairs of directories by how many bytes they have in common.
#[derive(Debug, Parser)]
#[command(name = "dirdupes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and the report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Index file to read and write [default: index.json]
    #[arg(short, long, global = true, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Additional TOML config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List a directory tree into a new index and hash duplicate candidates
    Prepare(PrepareArgs),
    /// Drop vanished files from the index and hash new candidates
    Update(HashArgs),
    /// Remove every stored hash from the index
    Clear,
    /// Rank directory pairs by shared duplicate bytes
    Analyze(AnalyzeArgs),
}

/// Hashing options shared by `prepare` and `update`.
#[derive(Debug, Clone, Default, Args)]
pub struct HashArgs {
    /// Content hash algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of I/O threads for hashing (1 = sequential)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..=256))]
    pub io_threads: Option<u64>,
}

/// Arguments for the prepare subcommand.
#[derive(Debug, Args)]
pub struct PrepareArgs {
    /// Directory to index
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Only index files with this extension (without the dot)
    #[arg(long, value_name = "EXT")]
    pub ext: Option<String>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Follow symbolic links while listing
    ///
    /// Warning: symlink cycles are detected and reported, not followed.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Write the listing only, without hashing
    #[arg(long)]
    pub no_hash: bool,

    #[command(flatten)]
    pub hash: HashArgs,
}

/// Arguments for the analyze subcommand.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Number of directory pairs to print (all by default)
    #[arg(long, value_name = "N")]
    pub head: Option<usize>,

    /// List the matching files of each directory pair
    #[arg(short, long)]
    pub details: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Use only hashes already in the index
    #[arg(long)]
    pub no_hash: bool,

    /// Cap the file pairs enumerated per duplicate set
    #[arg(long, value_name = "K")]
    pub max_pairs_per_set: Option<usize>,

    /// Do not write newly computed hashes back to the index
    #[arg(long)]
    pub no_save: bool,

    #[command(flatten)]
    pub hash: HashArgs,
}
