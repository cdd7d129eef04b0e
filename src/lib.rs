//! photodupe - Progressive Duplicate Photo Finder
//!
//! A cross-platform CLI tool that finds byte-for-byte duplicate files using
//! a staged pipeline of content probes (size, leading bytes, sparse
//! fingerprint), and organizes photo collections into a date-based symlink
//! tree.

pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod logging;
pub mod organize;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bytesize::ByteSize;
use yansi::Paint;

use crate::cli::{Cli, Commands, ReportFormat, ScanArgs, SortArgs};
use crate::config::Config;
use crate::detector::{detect, DetectorConfig};
use crate::error::{ConfigError, ExitCode};
use crate::organize::ExifTool;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::{FileEntry, Walker, WalkerConfig};
use crate::signal::ShutdownHandler;

/// Run the application with parsed CLI arguments.
///
/// # Errors
///
/// Returns an error for fatal problems (bad folder arguments, unwritable
/// report target). Recoverable per-file failures are handled internally and
/// reflected in the exit code instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    match cli.command {
        Commands::Scan(args) => run_scan(&args, cli.quiet),
        Commands::Sort(args) => run_sort(&args, cli.quiet),
    }
}

/// Validate folder arguments and resolve them to absolute paths.
fn resolve_folders(folders: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
    folders
        .iter()
        .map(|folder| {
            if !folder.exists() {
                return Err(ConfigError::MissingFolder(folder.clone()));
            }
            if !folder.is_dir() {
                return Err(ConfigError::NotADirectory(folder.clone()));
            }
            if folder.is_absolute() {
                Ok(folder.clone())
            } else {
                let cwd = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
                Ok(cwd.join(folder))
            }
        })
        .collect()
}

/// Walk every root in order and collect the file list.
///
/// Returns the entries plus the number of enumeration errors encountered.
fn collect_files(
    folders: &[PathBuf],
    config: &WalkerConfig,
    handler: &ShutdownHandler,
    progress: &Arc<Progress>,
) -> (Vec<FileEntry>, usize) {
    let mut files = Vec::new();
    let mut errors = 0usize;

    progress.on_phase_start("walking", 0);
    for root in folders {
        let walker = Walker::new(root, config.clone()).with_shutdown_flag(handler.get_flag());
        for entry in walker.walk() {
            match entry {
                Ok(file) => {
                    progress.on_progress(files.len() + 1, file.path.to_string_lossy().as_ref());
                    files.push(file);
                }
                Err(e) => {
                    log::warn!("{}", e);
                    errors += 1;
                }
            }
        }
    }
    progress.on_phase_end("walking");

    (files, errors)
}

fn run_scan(args: &ScanArgs, quiet: bool) -> Result<ExitCode> {
    let config = Config::load();
    let folders = resolve_folders(&args.folders)?;
    for folder in &folders {
        log::info!("Operating on: {}", folder.display());
    }

    let handler = signal::install_handler();
    let progress = Arc::new(Progress::new(quiet));

    let walker_config = WalkerConfig {
        follow_symlinks: args.follow_symlinks,
        skip_hidden: args.skip_hidden || config.skip_hidden,
        min_size: args.min_size,
        max_size: args.max_size,
        ignore_patterns: args.ignore_patterns.clone(),
    };

    let (files, scan_errors) = collect_files(&folders, &walker_config, &handler, &progress);
    log::info!("Total number of files to check: {}", files.len());

    let detector_config = DetectorConfig::default()
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::clone(&progress) as Arc<dyn ProgressCallback>);
    let (records, stats) = detect(&files, &detector_config);

    let format = args.output.unwrap_or(config.output);
    write_report(args.report.as_deref(), format, &records, &stats)?;

    if !quiet {
        let reclaimable: u64 = records.iter().map(|r| r.size).sum();
        let summary = format!(
            "Search ended: {} duplicates found out of {} files ({} reclaimable)",
            records.len(),
            stats.total_files,
            ByteSize::b(reclaimable)
        );
        if records.is_empty() {
            eprintln!("{}", summary.green());
        } else {
            eprintln!("{}", summary.yellow());
        }
    }

    if stats.interrupted {
        return Ok(ExitCode::Interrupted);
    }
    if scan_errors > 0 || stats.failed_files > 0 {
        return Ok(ExitCode::PartialSuccess);
    }
    if records.is_empty() {
        Ok(ExitCode::NoDuplicates)
    } else {
        Ok(ExitCode::Success)
    }
}

/// Render the duplicate report to the chosen target.
fn write_report(
    target: Option<&Path>,
    format: ReportFormat,
    records: &[detector::DuplicateRecord],
    stats: &detector::DetectStats,
) -> Result<()> {
    let mut writer: Box<dyn Write> = match target {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create report file {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ReportFormat::Text => TextOutput::new(records, stats).write_to(&mut writer)?,
        ReportFormat::Json => JsonOutput::new(records, stats).write_to(&mut writer)?,
        ReportFormat::Csv => CsvOutput::new(records).write_to(&mut writer)?,
    }
    Ok(())
}

fn run_sort(args: &SortArgs, quiet: bool) -> Result<ExitCode> {
    let folders = resolve_folders(&args.folders)?;
    for folder in &folders {
        log::info!("Operating on: {}", folder.display());
    }

    let handler = signal::install_handler();
    let progress = Arc::new(Progress::new(quiet));

    let walker_config = WalkerConfig {
        follow_symlinks: args.follow_symlinks,
        skip_hidden: args.skip_hidden,
        ..Default::default()
    };

    let (files, _) = collect_files(&folders, &walker_config, &handler, &progress);
    log::info!("Total number of pictures to sort: {}", files.len());
    if handler.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }

    std::fs::create_dir_all(&args.dest).with_context(|| {
        format!(
            "Failed to create destination directory {}",
            args.dest.display()
        )
    })?;

    let paths: Vec<PathBuf> = files.into_iter().map(|f| f.path).collect();
    let summary = organize::sort_photos(paths, &args.dest, &ExifTool::new())?;

    if !quiet {
        let message = format!(
            "Sorted {} files into {} ({} without dates)",
            summary.linked,
            args.dest.display(),
            summary.unsorted.len()
        );
        if summary.unsorted.is_empty() {
            eprintln!("{}", message.green());
        } else {
            eprintln!("{}", message.yellow());
        }
    }

    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_folders_accepts_directories() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_folders(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(resolved, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_resolve_folders_rejects_missing() {
        let err = resolve_folders(&[PathBuf::from("/no/such/folder/xyz")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFolder(_)));
    }

    #[test]
    fn test_resolve_folders_rejects_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, b"not a folder").unwrap();

        let err = resolve_folders(&[file]).unwrap_err();
        assert!(matches!(err, ConfigError::NotADirectory(_)));
    }

    #[test]
    fn test_resolve_folders_makes_relative_absolute() {
        // "." always exists and is a directory.
        let resolved = resolve_folders(&[PathBuf::from(".")]).unwrap();
        assert!(resolved[0].is_absolute());
    }
}
