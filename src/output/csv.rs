//! CSV output formatter for the duplicate report.
//!
//! One row is generated for each duplicate record.
//!
//! # Columns
//!
//! - `duplicate`: path of the duplicate file
//! - `original`: path of the first-seen file it copies
//! - `size`: shared size in bytes

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::detector::DuplicateRecord;

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

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    /// Path of the duplicate file
    duplicate: &'a str,
    /// Path of the original file
    original: &'a str,
    /// Shared size in bytes
    size: u64,
}

/// CSV output formatter.
pub struct CsvOutput<'a> {
    records: &'a [DuplicateRecord],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(records: &'a [DuplicateRecord]) -> Self {
        Self { records }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for record in self.records {
            let duplicate = record.path.to_string_lossy();
            let original = record.original.to_string_lossy();
            csv_writer.serialize(CsvRow {
                duplicate: &duplicate,
                original: &original,
                size: record.size,
            })?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render the CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `CsvOutputError` if serialization fails.
    pub fn render(&self) -> Result<String, CsvOutputError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
