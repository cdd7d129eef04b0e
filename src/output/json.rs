//! JSON output formatter for the duplicate report.
//!
//! Provides machine-readable output for automation and scripting.

use std::io;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::detector::{DetectStats, DuplicateRecord};

/// Errors that can occur during JSON output generation.
#[derive(Debug, Error)]
pub enum JsonOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The complete report document.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    /// When the report was generated (RFC 3339)
    generated: String,
    /// Total files examined
    total_files: usize,
    /// Number of duplicate records
    duplicate_count: usize,
    /// Files skipped due to read errors
    failed_files: usize,
    /// Bytes freed if every duplicate were removed
    reclaimable_bytes: u64,
    /// The duplicate records
    duplicates: &'a [DuplicateRecord],
}

/// JSON output formatter.
pub struct JsonOutput<'a> {
    records: &'a [DuplicateRecord],
    stats: &'a DetectStats,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output formatter.
    #[must_use]
    pub fn new(records: &'a [DuplicateRecord], stats: &'a DetectStats) -> Self {
        Self { records, stats }
    }

    fn report(&self) -> JsonReport<'a> {
        let now: DateTime<Utc> = Utc::now();
        JsonReport {
            generated: now.to_rfc3339(),
            total_files: self.stats.total_files,
            duplicate_count: self.records.len(),
            failed_files: self.stats.failed_files,
            reclaimable_bytes: self.records.iter().map(|r| r.size).sum(),
            duplicates: self.records,
        }
    }

    /// Write the pretty-printed report to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `JsonOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut writer, &self.report())?;
        writeln!(writer)?;
        Ok(())
    }

    /// Render the report as a pretty-printed string.
    ///
    /// # Errors
    ///
    /// Returns `JsonOutputError` if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, JsonOutputError> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}
