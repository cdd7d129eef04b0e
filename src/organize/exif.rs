//! Creation date resolution through exiftool.
//!
//! Dates are read in one batch invocation per tag: `exiftool -q -T <tag>`
//! prints one line per file, which is far faster than spawning the tool per
//! file. The [`DateSource`] trait is the seam tests use to substitute a
//! canned implementation.

use std::path::PathBuf;
use std::process::Command;

use chrono::NaiveDate;

use super::SortError;

/// Metadata tags tried in order when resolving a photo's creation date.
pub const DATE_TAGS: [&str; 3] = ["-CreateDate", "-DateAcquired", "-FileModifyDate"];

/// Source of per-file creation dates.
pub trait DateSource {
    /// Resolve the creation date of each file using the given tag.
    ///
    /// The returned vector is parallel to `files`; `None` marks a file the
    /// tag could not date.
    ///
    /// # Errors
    ///
    /// Returns a [`SortError`] when the underlying tool cannot be run.
    fn create_dates(
        &self,
        tag: &str,
        files: &[PathBuf],
    ) -> Result<Vec<Option<NaiveDate>>, SortError>;
}

/// Date source backed by the external `exiftool` program.
#[derive(Debug, Clone)]
pub struct ExifTool {
    program: String,
}

impl ExifTool {
    /// Create a date source invoking `exiftool` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: "exiftool".to_string(),
        }
    }

    /// Use a specific program path instead of `exiftool`.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for ExifTool {
    fn default() -> Self {
        Self::new()
    }
}

impl DateSource for ExifTool {
    fn create_dates(
        &self,
        tag: &str,
        files: &[PathBuf],
    ) -> Result<Vec<Option<NaiveDate>>, SortError> {
        let output = Command::new(&self.program)
            .arg("-q")
            .arg("-T")
            .arg(tag)
            .args(files)
            .output()
            .map_err(|e| SortError::ToolSpawn {
                tool: self.program.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = stdout.lines().collect();

        // One output line per input file; a short read leaves the tail
        // undated rather than misaligning the mapping.
        Ok((0..files.len())
            .map(|i| lines.get(i).copied().and_then(parse_date_line))
            .collect())
    }
}

/// Parse one `exiftool -T` output line into a date.
///
/// Lines look like `2019:06:12 18:03:24+02:00`; a bare `-` marks a missing
/// tag. Anything that does not start with a valid `year:month:day` yields
/// `None`.
fn parse_date_line(line: &str) -> Option<NaiveDate> {
    let date_part = line.split_whitespace().next()?;
    let mut fields = date_part.split(':');

    let year: i32 = fields.next()?.parse().ok()?;
    let month: u32 = fields.next()?.parse().ok()?;
    let day: u32 = fields.next()?.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}
