//! Duplicate detection: a staged funnel of content probes.
//!
//! # Overview
//!
//! Files are classified one at a time against three growing indices, each a
//! cheaper proxy gating entry to the next, most expensive, stage:
//!
//! 1. **Size** — files are bucketed by exact byte size; a unique size means
//!    a unique file, with no content read at all.
//! 2. **Prefix** — size collisions compare the first 2048 bytes.
//! 3. **Fingerprint** — prefix collisions compare a sparse sample of at most
//!    64 bytes.
//!
//! A file that collides at all three stages is reported as a duplicate of
//! the first-seen file sharing its keys. Detection is strictly sequential
//! over the input order: every verdict depends on the insertions made for
//! all prior files, and the first file observed for a key stays its
//! representative for the whole run.
//!
//! # Example
//!
//! ```no_run
//! use photodupe::detector::{detect, DetectorConfig};
//! use photodupe::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//!
//! let (records, stats) = detect(&files, &DetectorConfig::default());
//! println!("{} duplicates in {} files", records.len(), stats.total_files);
//! ```

pub mod probe;
pub mod session;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::progress::ProgressCallback;
use crate::scanner::FileEntry;

pub use probe::{ProbeError, FINGERPRINT_LEN, PREFIX_LEN, SAMPLE_BLOCKS};
pub use session::{DetectorSession, Verdict};

/// A confirmed duplicate relationship.
///
/// `original` is the earliest-seen file sharing size, prefix, and
/// fingerprint with `path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRecord {
    /// The duplicate file
    pub path: PathBuf,
    /// The first-seen file it duplicates
    pub original: PathBuf,
    /// Byte size shared by both files
    pub size: u64,
}

/// The funnel stage at which a file was separated from all earlier files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No earlier file had this size.
    Size,
    /// Size collided, leading bytes did not.
    Prefix,
    /// Size and prefix collided, the sparse sample did not.
    Fingerprint,
}

/// Configuration for a detection run.
#[derive(Clone, Default)]
pub struct DetectorConfig {
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DetectorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorConfig")
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl DetectorConfig {
    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from a detection run.
#[derive(Debug, Default)]
pub struct DetectStats {
    /// Total files handed to the detector
    pub total_files: usize,
    /// Files that stopped at the size stage
    pub unique_sizes: usize,
    /// Files that stopped at the prefix stage
    pub unique_prefixes: usize,
    /// Files that stopped at the fingerprint stage
    pub unique_fingerprints: usize,
    /// Confirmed duplicates
    pub duplicates: usize,
    /// Files skipped because they could not be read
    pub failed_files: usize,
    /// The read failures, one per skipped file
    pub errors: Vec<ProbeError>,
    /// Whether the run was cut short by the shutdown flag
    pub interrupted: bool,
}

impl DetectStats {
    /// Files that never needed a content read: a unique size settles the
    /// verdict from metadata alone.
    #[must_use]
    pub fn settled_without_io(&self) -> usize {
        self.unique_sizes
    }

    /// Percentage of files classified without reaching the fingerprint
    /// stage.
    #[must_use]
    pub fn early_exit_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            let early = self.unique_sizes + self.unique_prefixes;
            (early as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Run the full funnel over an ordered file list.
///
/// Files are processed strictly in the given order; the first file of a
/// duplicate group is reported as the original for every later member.
/// Unreadable files are skipped and recorded in the stats, never aborting
/// the run. The shutdown flag is checked between files.
///
/// # Arguments
///
/// * `files` - Ordered list of files to classify
/// * `config` - Shutdown flag and progress callback
///
/// # Returns
///
/// The confirmed duplicate records, in detection order, plus run statistics.
#[must_use]
pub fn detect(files: &[FileEntry], config: &DetectorConfig) -> (Vec<DuplicateRecord>, DetectStats) {
    let mut session = DetectorSession::new();
    let mut records = Vec::new();
    let mut stats = DetectStats {
        total_files: files.len(),
        ..Default::default()
    };

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("detect", files.len());
    }

    for (idx, file) in files.iter().enumerate() {
        if config.is_shutdown_requested() {
            log::info!("Detection interrupted after {} files", idx);
            stats.interrupted = true;
            break;
        }

        if let Some(ref callback) = config.progress_callback {
            callback.on_progress(idx + 1, file.path.to_string_lossy().as_ref());
        }

        match session.process(file) {
            Ok(Verdict::Unique(Stage::Size)) => stats.unique_sizes += 1,
            Ok(Verdict::Unique(Stage::Prefix)) => stats.unique_prefixes += 1,
            Ok(Verdict::Unique(Stage::Fingerprint)) => stats.unique_fingerprints += 1,
            Ok(Verdict::Duplicate(record)) => {
                log::info!(
                    "Duplicate found: '{}' --> '{}'",
                    record.path.display(),
                    record.original.display()
                );
                stats.duplicates += 1;
                records.push(record);
            }
            Err(e) => {
                log::warn!("Skipping unreadable file: {}", e);
                stats.failed_files += 1;
                stats.errors.push(e);
            }
        }
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("detect");
    }

    (records, stats)
}
