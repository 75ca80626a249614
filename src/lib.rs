//! dirdupes - find directory pairs sharing duplicated content
//!
//! A file-system index (path, size and, where useful, a content hash per
//! file) is built once and kept up to date. Analysis groups identical files
//! by hash and ranks every pair of directories by the number of bytes their
//! identical files have in common, which points at copied or partially
//! synchronized directory trees.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod index;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{AnalyzeArgs, Cli, Commands, HashArgs, PrepareArgs};
use crate::config::Config;
use crate::duplicates::{FinderConfig, HashConfig, HashStats, PairFinder, SelectiveHasher};
use crate::error::ExitCode;
use crate::index::{clear_hashes, prune_missing, Index};
use crate::output::write_report;
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{HashAlgorithm, Walker, WalkerConfig};
use crate::signal::ShutdownHandler;

/// Runtime context shared by all subcommands.
struct App {
    config: Config,
    index_path: std::path::PathBuf,
    color: bool,
    shutdown: ShutdownHandler,
    progress: Arc<dyn ProgressCallback>,
}

impl App {
    fn algorithm(&self, args: &HashArgs) -> HashAlgorithm {
        args.algorithm.unwrap_or(self.config.algorithm)
    }

    fn io_threads(&self, args: &HashArgs) -> usize {
        args.io_threads
            .map_or(self.config.io_threads, |n| n as usize)
            .max(1)
    }

    fn load_index(&self) -> Result<Index> {
        let index = Index::load(&self.index_path)
            .with_context(|| format!("Failed to load index {}", self.index_path.display()))?;
        log::info!(
            "Loaded {} records ({} hashed) from {}",
            index.records.len(),
            index.hashed_count(),
            self.index_path.display()
        );
        Ok(index)
    }

    fn save_index(&self, index: &mut Index) -> Result<()> {
        index
            .save(&self.index_path)
            .with_context(|| format!("Failed to save index {}", self.index_path.display()))?;
        log::info!(
            "Saved {} records ({} hashed) to {}",
            index.records.len(),
            index.hashed_count(),
            self.index_path.display()
        );
        Ok(())
    }

    /// Hash the index's candidates with the selected algorithm.
    fn hash_index(&self, index: &mut Index, args: &HashArgs) -> Result<HashStats> {
        let algorithm = self.algorithm(args);
        index.ensure_algorithm(algorithm.name())?;

        let config = HashConfig::default()
            .with_io_threads(self.io_threads(args))
            .with_shutdown_flag(self.shutdown.get_flag())
            .with_progress_callback(self.progress.clone());
        let hasher = SelectiveHasher::new(algorithm.build(), config);
        Ok(hasher.hash_records(&mut index.records))
    }

    fn prepare(&self, args: &PrepareArgs) -> Result<ExitCode> {
        let walker_config = WalkerConfig {
            extension: args.ext.clone(),
            follow_symlinks: args.follow_symlinks || self.config.follow_symlinks,
            skip_hidden: args.skip_hidden || self.config.skip_hidden,
        };
        let walker = Walker::new(&args.dir, walker_config)
            .with_shutdown_flag(self.shutdown.get_flag())
            .with_progress_callback(self.progress.clone());

        let (records, errors) = walker
            .walk()
            .with_context(|| format!("Failed to list {}", args.dir.display()))?;
        if self.shutdown.is_shutdown_requested() {
            log::warn!("Listing interrupted, index not written");
            return Ok(ExitCode::Interrupted);
        }
        if !errors.is_empty() {
            log::warn!("{} entries could not be read while listing", errors.len());
        }

        let algorithm = self.algorithm(&args.hash);
        let mut index = Index::new(records, Some(algorithm.name().to_string()));
        self.save_index(&mut index)?;

        if args.no_hash {
            return Ok(ExitCode::Success);
        }

        let stats = self.hash_index(&mut index, &args.hash)?;
        self.save_index(&mut index)?;
        Ok(hash_exit_code(&stats))
    }

    fn update(&self, args: &HashArgs) -> Result<ExitCode> {
        let mut index = self.load_index()?;
        prune_missing(&mut index.records, Path::exists);
        let stats = self.hash_index(&mut index, args)?;
        self.save_index(&mut index)?;
        Ok(hash_exit_code(&stats))
    }

    fn clear(&self) -> Result<ExitCode> {
        let mut index = self.load_index()?;
        let cleared = clear_hashes(&mut index.records);
        index.algorithm = None;
        self.save_index(&mut index)?;
        log::info!("Cleared {} hashes", cleared);
        Ok(ExitCode::Success)
    }

    fn analyze(&self, args: &AnalyzeArgs) -> Result<ExitCode> {
        let mut index = self.load_index()?;
        let algorithm = self.algorithm(&args.hash);
        if !args.no_hash {
            index.ensure_algorithm(algorithm.name())?;
        }

        let config = FinderConfig::default()
            .with_head(args.head.or(self.config.head))
            .with_details(args.details)
            .with_io_threads(self.io_threads(&args.hash))
            .with_max_pairs_per_set(args.max_pairs_per_set.or(self.config.max_pairs_per_set))
            .with_hash_missing(!args.no_hash)
            .with_hasher(algorithm.build())
            .with_shutdown_flag(self.shutdown.get_flag())
            .with_progress_callback(self.progress.clone());

        let report = PairFinder::new(config).find_pairs(&mut index.records)?;
        let summary = &report.summary;

        if !args.no_save && (summary.newly_hashed > 0 || summary.missing > 0) {
            self.save_index(&mut index)?;
        }

        let code = if summary.interrupted {
            ExitCode::Interrupted
        } else if summary.has_failures() {
            ExitCode::PartialSuccess
        } else if report.pairs.is_empty() {
            ExitCode::NoPairs
        } else {
            ExitCode::Success
        };

        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        write_report(
            &report,
            args.output,
            self.color,
            code,
            stdout.lock(),
            stderr.lock(),
        )
        .context("Failed to write report")?;

        log::debug!("Analysis finished with {:?}", code);
        Ok(code)
    }
}

fn hash_exit_code(stats: &HashStats) -> ExitCode {
    if stats.interrupted {
        ExitCode::Interrupted
    } else if stats.failed > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

/// Run the CLI command and return the process exit code.
///
/// # Errors
///
/// Returns an error for fatal conditions: unreadable or malformed index,
/// invalid configuration, an unlistable root directory, or a failed save.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let index_path = cli.index.clone().unwrap_or_else(|| config.index.clone());

    let shutdown = match signal::install_handler() {
        Ok(handler) => handler,
        Err(e) => {
            log::warn!("{e}; Ctrl+C will not save progress");
            ShutdownHandler::new()
        }
    };

    let color = !cli.no_color && std::io::stdout().is_terminal();

    let app = App {
        config,
        index_path,
        color,
        shutdown,
        progress: Arc::new(Progress::new(cli.quiet)),
    };

    match &cli.command {
        Commands::Prepare(args) => app.prepare(args),
        Commands::Update(args) => app.update(args),
        Commands::Clear => app.clear(),
        Commands::Analyze(args) => app.analyze(args),
    }
}
