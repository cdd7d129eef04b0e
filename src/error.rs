//! Structured error handling and exit codes.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Exit codes for the photodupe application.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (unexpected failure, bad configuration)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 3: Partial success (completed with some non-fatal read errors)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Scan completed but some files could not be read.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
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
            Self::Success => "PD000",
            Self::GeneralError => "PD001",
            Self::NoDuplicates => "PD002",
            Self::PartialSuccess => "PD003",
            Self::Interrupted => "PD130",
        }
    }
}

/// Fatal problems with the command-line invocation.
///
/// These are reported immediately and the process exits before any scanning
/// takes place.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A folder argument does not exist on disk.
    #[error("Folder does not exist: {0}")]
    MissingFolder(PathBuf),

    /// A folder argument exists but is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The current working directory could not be resolved while turning a
    /// relative folder argument into an absolute path.
    #[error("Cannot resolve current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "PD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
