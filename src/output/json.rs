//! JSON output formatter for analysis reports.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "pairs": [
//!     {
//!       "rank": 0,
//!       "pair": { "first": "a", "second": "b" },
//!       "total_size": 100,
//!       "match_count": 1,
//!       "files": [ { "size": 100, "first_path": "a/x", "second_path": "b/y" } ]
//!     }
//!   ],
//!   "summary": {
//!     "total_records": 3,
//!     "directory_pairs": 1,
//!     "duration_secs": 0.01,
//!     "interrupted": false,
//!     "exit_code": 0,
//!     "exit_code_name": "DD000"
//!   }
//! }
//! ```
//!
//! `files` is present only in detailed reports.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{RankedPair, Report, RunSummary};
use crate::error::ExitCode;

/// Summary with the exit code attached.
#[derive(Debug, Serialize)]
pub struct JsonSummary<'a> {
    /// Run statistics
    #[serde(flatten)]
    pub run: &'a RunSummary,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DD000")
    pub exit_code_name: &'static str,
}

/// Complete JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// Ranked directory pairs
    pub pairs: &'a [RankedPair],
    /// Run statistics
    pub summary: JsonSummary<'a>,
}

impl<'a> JsonOutput<'a> {
    /// Create a JSON output from a report and the run's exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dirdupes::duplicates::Report;
    /// use dirdupes::error::ExitCode;
    /// use dirdupes::output::json::JsonOutput;
    ///
    /// let report = Report::default();
    /// let output = JsonOutput::new(&report, ExitCode::NoPairs);
    /// assert!(output.to_json().unwrap().contains("\"pairs\":[]"));
    /// ```
    #[must_use]
    pub fn new(report: &'a Report, exit_code: ExitCode) -> Self {
        Self {
            pairs: &report.pairs,
            summary: JsonSummary {
                run: &report.summary,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix(),
            },
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer).map_err(serde_json::Error::io)?;
        Ok(())
    }
}
