//! Human-readable report output.
//!
//! One line per directory pair:
//!
//! ```text
//!      0: "a" <-> "b" total size of matching files: 100 (100 B), #matching files: 1
//! ```
//!
//! With details, each matching file pair follows as a tab-separated
//! `size  path  path` row, closed by a separator line. A run summary block
//! is always written last.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::duplicates::{RankedPair, Report, RunSummary};

const SEPARATOR: &str = "==========================================";

/// Text output formatter.
pub struct TextOutput<'a> {
    report: &'a Report,
    color: bool,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        Self {
            report,
            color: false,
        }
    }

    /// Enable or disable terminal colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Write the pair listing and the summary block.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for ranked in &self.report.pairs {
            writeln!(writer, "{}", self.pair_line(ranked))?;
            if let Some(ref files) = ranked.files {
                for file in files {
                    writeln!(
                        writer,
                        "{}\t{}\t{}",
                        file.size, file.first_path, file.second_path
                    )?;
                }
                writeln!(writer, "{SEPARATOR}")?;
            }
        }

        if self.report.pairs.is_empty() {
            writeln!(writer, "No directory pairs share duplicate files.")?;
        }

        writeln!(writer)?;
        self.write_summary(&mut writer, &self.report.summary)?;
        writer.flush()
    }

    /// Write only the summary block.
    ///
    /// Used next to formats that have no room for it, such as CSV.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_summary_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        self.write_summary(&mut writer, &self.report.summary)?;
        writer.flush()
    }

    /// Render the report to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if formatting fails.
    pub fn to_string(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn pair_line(&self, ranked: &RankedPair) -> String {
        let first = format!("\"{}\"", ranked.pair.first);
        let second = format!("\"{}\"", ranked.pair.second);
        let human = format_size(ranked.total_size);
        if self.color {
            format!(
                "{:>6}: {} <-> {} total size of matching files: {} ({}), #matching files: {}",
                ranked.rank,
                first.cyan(),
                second.cyan(),
                ranked.total_size,
                human.bold(),
                ranked.match_count
            )
        } else {
            format!(
                "{:>6}: {} <-> {} total size of matching files: {} ({}), #matching files: {}",
                ranked.rank, first, second, ranked.total_size, human, ranked.match_count
            )
        }
    }

    fn write_summary<W: Write>(&self, writer: &mut W, summary: &RunSummary) -> io::Result<()> {
        let title = "Summary";
        if self.color {
            writeln!(writer, "{}", title.bold().underline())?;
        } else {
            writeln!(writer, "{title}")?;
        }

        writeln!(writer, "  Files in index:        {}", summary.total_records)?;
        if summary.missing > 0 {
            writeln!(
                writer,
                "  Missing (skipped):     {}/{}",
                summary.missing, summary.total_records
            )?;
        }
        writeln!(writer, "  Unique size (skipped): {}", summary.skipped_unique)?;
        writeln!(writer, "  Hash candidates:       {}", summary.candidates)?;
        writeln!(
            writer,
            "  Hashed:                {} new, {} from index ({} read, {})",
            summary.newly_hashed,
            summary.already_hashed,
            format_size(summary.bytes_hashed),
            summary.algorithm
        )?;
        if summary.hash_failures > 0 {
            let line = format!("  Hash failures:         {}", summary.hash_failures);
            if self.color {
                writeln!(writer, "{}", line.yellow())?;
            } else {
                writeln!(writer, "{line}")?;
            }
        }
        writeln!(
            writer,
            "  Duplicate sets:        {} ({} files)",
            summary.duplicate_sets, summary.duplicated_files
        )?;
        writeln!(writer, "  Directory pairs:       {}", summary.directory_pairs)?;
        if summary.truncated_pairs > 0 {
            writeln!(
                writer,
                "  Truncated file pairs:  {}",
                summary.truncated_pairs
            )?;
        }
        writeln!(writer, "  Duration:              {:.2?}", summary.duration)?;
        if summary.interrupted {
            let line = "  Interrupted: results cover the files hashed so far";
            if self.color {
                writeln!(writer, "{}", line.red())?;
            } else {
                writeln!(writer, "{line}")?;
            }
        }
        Ok(())
    }
}

/// Format a byte count with binary units.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}
