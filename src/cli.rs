//! Command-line interface definitions for photodupe.
//!
//! This module defines all CLI arguments, subcommands, and options using the
//! clap derive API. Global options (verbosity, color) sit above two
//! subcommands: `scan` for duplicate detection and `sort` for date-based
//! photo organization.
//!
//! # Example
//!
//! ```bash
//! # Scan one or more folders for exact duplicates
//! photodupe scan ~/Pictures ~/Downloads
//!
//! # Machine-readable output, written to a file
//! photodupe scan ~/Pictures --output json --report dupes.json
//!
//! # Organize photos into a year/month symlink tree
//! photodupe sort ~/Pictures --dest ~/sorted
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Progressive duplicate photo finder.
///
/// photodupe finds byte-for-byte duplicate files using a staged pipeline of
/// content probes (size, leading bytes, sparse fingerprint) so that full file
/// reads are never needed, and can organize photos into a date-based symlink
/// tree.
#[derive(Debug, Parser)]
#[command(name = "photodupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and the final report
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for photodupe.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan folders for duplicate files
    Scan(ScanArgs),
    /// Organize photos into a year/month symlink tree by creation date
    Sort(SortArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Folders to scan for duplicates (recursively)
    #[arg(value_name = "FOLDER", required = true)]
    pub folders: Vec<PathBuf>,

    /// Output format (text by default, json/csv for scripting)
    ///
    /// Falls back to the persisted configuration when omitted.
    #[arg(short, long, value_enum)]
    pub output: Option<ReportFormat>,

    /// Write the duplicate report to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Minimum file size to consider (e.g., 1KB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 100MB, 1GiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,
}

/// Arguments for the sort subcommand.
#[derive(Debug, Args)]
pub struct SortArgs {
    /// Folders containing the photos to organize (recursively)
    #[arg(value_name = "FOLDER", required = true)]
    pub folders: Vec<PathBuf>,

    /// Destination directory for the year/month tree
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dest: PathBuf,

    /// Follow symbolic links while collecting photos
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

/// Output format for the duplicate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One record per line, original console format
    #[default]
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes B, KB, KiB, MB, MiB, GB, GiB; bare numbers are bytes.
/// Case-insensitive.
///
/// # Errors
///
/// Returns an error if the string is empty, the number does not parse, or the
/// suffix is unknown.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, suffix) = s.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| format!("Invalid size: '{s}'"))?;

    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1 << 10,
        "MB" | "M" => 1_000_000,
        "MIB" => 1 << 20,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1 << 30,
        other => return Err(format!("Unknown size suffix: '{other}'")),
    };

    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size too large: '{s}'"))
}
