//! Date-based photo organization.
//!
//! # Overview
//!
//! Builds a `year/month` symlink tree for a photo collection. Creation dates
//! come from an external metadata tool through the [`DateSource`] seam;
//! files the first tag cannot date are retried with fallback tags, and
//! whatever remains undated is listed in `unsorted.txt` under the
//! destination.
//!
//! The originals are never moved or copied, only linked.

pub mod exif;
pub mod layout;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use exif::{DateSource, ExifTool, DATE_TAGS};
pub use layout::LinkOutcome;

/// Name of the report listing files without a resolvable date.
pub const UNSORTED_FILE: &str = "unsorted.txt";

/// Errors that can occur while organizing photos.
#[derive(Debug, Error)]
pub enum SortError {
    /// The external metadata tool could not be run.
    #[error("Failed to run {tool}: {source}")]
    ToolSpawn {
        /// Program that failed to start
        tool: String,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// An I/O error occurred while building the tree.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Result of a full sort run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSummary {
    /// Files linked into the tree
    pub linked: usize,
    /// Files with no resolvable date, listed in `unsorted.txt`
    pub unsorted: Vec<PathBuf>,
}

/// Organize photos into a `year/month` symlink tree under `dest`.
///
/// Dates are resolved tag by tag: files the first tag cannot date are
/// retried with the next one, in [`DATE_TAGS`] order. Files still undated
/// after the last tag are written to `unsorted.txt`.
///
/// # Errors
///
/// Returns a [`SortError`] when the metadata tool cannot be run or the tree
/// cannot be written. Per-file link failures are logged and the file is
/// counted as unsorted instead.
pub fn sort_photos(
    files: Vec<PathBuf>,
    dest: &Path,
    source: &dyn DateSource,
) -> Result<SortSummary, SortError> {
    let mut remaining = files;
    let mut linked = 0;

    for tag in DATE_TAGS {
        if remaining.is_empty() {
            break;
        }
        log::info!("Resolving dates with {} for {} files", tag, remaining.len());
        let dates = source.create_dates(tag, &remaining)?;
        let outcome = layout::link_into_tree(dest, &remaining, &dates)?;
        linked += outcome.linked;
        remaining = outcome.unsorted;
    }

    write_unsorted_report(dest, &remaining)?;
    Ok(SortSummary {
        linked,
        unsorted: remaining,
    })
}

/// Write the list of undatable files to `unsorted.txt` under `dest`.
fn write_unsorted_report(dest: &Path, unsorted: &[PathBuf]) -> Result<(), SortError> {
    let path = dest.join(UNSORTED_FILE);
    let io_err = |source| SortError::Io {
        path: path.clone(),
        source,
    };

    let mut file = File::create(&path).map_err(&io_err)?;
    writeln!(file, "===================").map_err(&io_err)?;
    for entry in unsorted {
        log::warn!("{} has no date!", entry.display());
        writeln!(file, "{}", entry.display()).map_err(&io_err)?;
    }
    Ok(())
}
