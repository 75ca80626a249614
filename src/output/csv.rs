//! CSV output formatter for analysis reports.
//!
//! # Columns
//!
//! One row per directory pair:
//!
//! - `rank`, `dir_a`, `dir_b`, `total_size`, `match_count`
//!
//! With details, one row per matching file pair instead:
//!
//! - `rank`, `dir_a`, `dir_b`, `size`, `path_a`, `path_b`

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::RankedPair;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct PairRow<'a> {
    rank: usize,
    dir_a: &'a str,
    dir_b: &'a str,
    total_size: u64,
    match_count: usize,
}

#[derive(Debug, Serialize)]
struct FileRow<'a> {
    rank: usize,
    dir_a: &'a str,
    dir_b: &'a str,
    size: u64,
    path_a: &'a str,
    path_b: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    pairs: &'a [RankedPair],
    details: bool,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    ///
    /// `details` selects one row per matching file pair.
    #[must_use]
    pub fn new(pairs: &'a [RankedPair], details: bool) -> Self {
        Self { pairs, details }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        // Headers are written explicitly so an empty report still has them.
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        if self.details {
            csv_writer.write_record(["rank", "dir_a", "dir_b", "size", "path_a", "path_b"])?;
            for ranked in self.pairs {
                for file in ranked.files.iter().flatten() {
                    csv_writer.serialize(FileRow {
                        rank: ranked.rank,
                        dir_a: &ranked.pair.first,
                        dir_b: &ranked.pair.second,
                        size: file.size,
                        path_a: &file.first_path,
                        path_b: &file.second_path,
                    })?;
                }
            }
        } else {
            csv_writer.write_record(["rank", "dir_a", "dir_b", "total_size", "match_count"])?;
            for ranked in self.pairs {
                csv_writer.serialize(PairRow {
                    rank: ranked.rank,
                    dir_a: &ranked.pair.first,
                    dir_b: &ranked.pair.second,
                    total_size: ranked.total_size,
                    match_count: ranked.match_count,
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Generate CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn to_string(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
