//! Exit codes and structured error output.

use serde::Serialize;

use crate::signal::EXIT_CODE_INTERRUPTED;

/// Process exit codes.
///
/// - 0: pairs found (or a maintenance command succeeded)
/// - 1: unexpected failure
/// - 2: analysis completed, no directory pair shares a duplicate
/// - 3: completed, but some files could not be hashed
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed successfully.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Analysis found no directory pairs.
    NoPairs = 2,
    /// Completed with hashing failures.
    PartialSuccess = 3,
    /// Interrupted by the user.
    Interrupted = EXIT_CODE_INTERRUPTED as isize,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DD000",
            Self::GeneralError => "DD001",
            Self::NoPairs => "DD002",
            Self::PartialSuccess => "DD003",
            Self::Interrupted => "DD130",
        }
    }
}

/// Error report printed to stderr with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable message including the cause chain
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
