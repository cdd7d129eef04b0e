//! Plain text output: one record per line, then a summary.
//!
//! The line format is stable and parseable:
//!
//! ```text
//! '/photos/copy.jpg' --> '/photos/original.jpg'
//! ```

use std::io;

use crate::detector::{DetectStats, DuplicateRecord};

/// Text output formatter.
pub struct TextOutput<'a> {
    records: &'a [DuplicateRecord],
    stats: &'a DetectStats,
}

impl<'a> TextOutput<'a> {
    /// Create a new text output formatter.
    #[must_use]
    pub fn new(records: &'a [DuplicateRecord], stats: &'a DetectStats) -> Self {
        Self { records, stats }
    }

    /// Write the report to the given writer.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if writing fails.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        for record in self.records {
            writeln!(
                writer,
                "'{}' --> '{}'",
                record.path.display(),
                record.original.display()
            )?;
        }
        writeln!(
            writer,
            "{} duplicates found out of {} files",
            self.records.len(),
            self.stats.total_files
        )?;
        Ok(())
    }

    /// Render the report as a string.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if formatting fails.
    pub fn render(&self) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record(path: &str, original: &str, size: u64) -> DuplicateRecord {
        DuplicateRecord {
            path: PathBuf::from(path),
            original: PathBuf::from(original),
            size,
        }
    }

    #[test]
    fn test_text_output_lines() {
        let records = vec![
            record("/p/copy1.jpg", "/p/orig.jpg", 100),
            record("/p/copy2.jpg", "/p/orig.jpg", 100),
        ];
        let stats = DetectStats {
            total_files: 5,
            duplicates: 2,
            ..Default::default()
        };

        let text = TextOutput::new(&records, &stats).render().unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "'/p/copy1.jpg' --> '/p/orig.jpg'");
        assert_eq!(lines[1], "'/p/copy2.jpg' --> '/p/orig.jpg'");
        assert_eq!(lines[2], "2 duplicates found out of 5 files");
    }

    #[test]
    fn test_text_output_empty() {
        let stats = DetectStats {
            total_files: 3,
            ..Default::default()
        };
        let text = TextOutput::new(&[], &stats).render().unwrap();
        assert_eq!(text, "0 duplicates found out of 3 files\n");
    }
}
