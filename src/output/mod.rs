//! Report formatters for analysis results.
//!
//! This module provides different output formats for a [`Report`]:
//! - Text for reading in a terminal
//! - JSON for automation and scripting
//! - CSV for spreadsheet import
//!
//! # Example
//!
//! ```no_run
//! use dirdupes::duplicates::{FinderConfig, PairFinder};
//! use dirdupes::error::ExitCode;
//! use dirdupes::index::Index;
//! use dirdupes::output::{write_report, OutputFormat};
//! use std::path::Path;
//!
//! let mut index = Index::load(Path::new("index.json")).unwrap();
//! let report = PairFinder::with_defaults().find_pairs(&mut index.records).unwrap();
//!
//! write_report(
//!     &report,
//!     OutputFormat::Json,
//!     false,
//!     ExitCode::Success,
//!     std::io::stdout(),
//!     std::io::stderr(),
//! )
//! .unwrap();
//! ```

pub mod csv;
pub mod json;
pub mod text;

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::duplicates::Report;
use crate::error::ExitCode;

// Re-export main types
pub use self::csv::{CsvOutput, CsvOutputError};
pub use json::JsonOutput;
pub use text::TextOutput;

/// Report output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Ranked pair lines and a summary block
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
    /// One CSV row per pair (or per file pair with --details)
    Csv,
}

/// Errors that can occur while writing a report.
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV serialization failed.
    #[error(transparent)]
    Csv(#[from] CsvOutputError),
}

/// Write `report` to `writer` in the requested format.
///
/// `color` only affects the text format. The exit code is embedded in the
/// JSON summary. CSV rows carry no run summary, so for CSV the summary block
/// (missing, skipped and failed counts) goes to `summary_writer` instead.
///
/// # Errors
///
/// Returns `OutputError` if serialization or writing fails.
pub fn write_report<W: Write, S: Write>(
    report: &Report,
    format: OutputFormat,
    color: bool,
    exit_code: ExitCode,
    writer: W,
    summary_writer: S,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Text => TextOutput::new(report).with_color(color).write_to(writer)?,
        OutputFormat::Json => JsonOutput::new(report, exit_code).write_to(writer)?,
        OutputFormat::Csv => {
            let details = report.pairs.iter().any(|p| p.files.is_some());
            CsvOutput::new(&report.pairs, details).write_to(writer)?;
            TextOutput::new(report)
                .with_color(color)
                .write_summary_to(summary_writer)?;
        }
    }
    Ok(())
}
