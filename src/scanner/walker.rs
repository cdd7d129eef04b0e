//! Directory walker implementation using jwalk for parallel traversal.
//!
//! Yields every regular file under a root, sorted by name within each
//! directory so that runs over the same tree always produce the same order.
//! Which file of a duplicate pair counts as the original depends on that
//! order, so determinism matters here.
//!
//! Zero-length files are yielded like any other: size 0 is a valid size
//! bucket and empty files of equal size are duplicates of each other.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for file discovery.
///
/// Uses jwalk for efficient parallel traversal of directory trees.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root directory.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag flips to `true`, the walker stops iteration as soon as
    /// possible.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Build a gitignore matcher from config patterns and any .gitignore file
    /// at the root.
    fn build_gitignore(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let gitignore_path = self.root.join(".gitignore");
        if gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: &Option<Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        // Gitignore matching expects paths relative to the root with forward
        // slashes even on Windows.
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        let normalized = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched(normalized, is_dir).is_ignore()
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if self.config.min_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.config.max_size.is_some_and(|max| size > max) {
            return false;
        }
        true
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Returns an iterator over [`FileEntry`] results. Errors are yielded as
    /// [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden)
            .sort(true);

        walk_dir.into_iter().filter_map(move |entry_result| {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                return None;
            }

            match entry_result {
                Ok(entry) => {
                    let path = entry.path();

                    if path == self.root {
                        return None;
                    }

                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }

                    if self.should_ignore(&path, false, &gitignore) {
                        log::trace!("Ignoring file: {}", path.display());
                        return None;
                    }

                    let is_symlink = file_type.is_symlink();
                    if is_symlink && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", path.display());
                        return None;
                    }

                    let metadata = if self.config.follow_symlinks {
                        std::fs::metadata(&path)
                    } else {
                        std::fs::symlink_metadata(&path)
                    };

                    let metadata = match metadata {
                        Ok(m) => m,
                        Err(e) => return Some(Err(io_error(&path, e))),
                    };

                    // Not a regular file after following the symlink
                    if !metadata.is_file() {
                        return None;
                    }

                    let size = metadata.len();
                    if !self.passes_size_filter(size) {
                        log::trace!(
                            "Skipping file due to size filter ({}): {}",
                            size,
                            path.display()
                        );
                        return None;
                    }

                    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                    Some(Ok(FileEntry::new(path, size, modified)))
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    Some(Err(ScanError::Io {
                        path,
                        source: std::io::Error::other(e.to_string()),
                    }))
                }
            }
        })
    }
}

/// Convert an I/O error into the matching `ScanError` variant.
fn io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => {
            log::warn!("Permission denied: {}", path.display());
            ScanError::PermissionDenied(path.to_path_buf())
        }
        ErrorKind::NotFound => {
            log::debug!("File not found (may have been deleted): {}", path.display());
            ScanError::NotFound(path.to_path_buf())
        }
        _ => {
            log::warn!("I/O error for {}: {}", path.display(), error);
            ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            }
        }
    }
}
