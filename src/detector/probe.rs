//! Content probes: prefix reads and sparse fingerprints.
//!
//! Both probes read a bounded number of bytes no matter how large the file
//! is. The prefix covers the leading 2048 bytes; the fingerprint samples at
//! most 64 bytes.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Number of leading bytes compared in the prefix stage.
pub const PREFIX_LEN: usize = 2048;

/// Maximum fingerprint length in bytes.
pub const FINGERPRINT_LEN: usize = 64;

/// Number of sample blocks a fingerprint is assembled from.
pub const SAMPLE_BLOCKS: usize = 4;

/// Errors that can occur while probing file content.
///
/// These are recoverable: the offending file is skipped for duplicate
/// purposes and the scan continues.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The file disappeared between enumeration and read time.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl ProbeError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed to read.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}

/// Read the first up-to-[`PREFIX_LEN`] bytes of a file.
///
/// Files shorter than the prefix length yield their whole content.
///
/// # Errors
///
/// Returns a [`ProbeError`] if the file cannot be opened or read.
pub fn read_prefix(path: &Path) -> Result<Vec<u8>, ProbeError> {
    let file = File::open(path).map_err(|e| ProbeError::from_io(path, e))?;
    let mut buf = Vec::with_capacity(PREFIX_LEN);
    file.take(PREFIX_LEN as u64)
        .read_to_end(&mut buf)
        .map_err(|e| ProbeError::from_io(path, e))?;
    Ok(buf)
}

/// Read the sparse fingerprint of a file.
///
/// Files of at most [`FINGERPRINT_LEN`] bytes fingerprint as their whole
/// content. Larger files are sampled in [`SAMPLE_BLOCKS`] passes of
/// `FINGERPRINT_LEN / SAMPLE_BLOCKS` bytes each; after pass `i` the cursor
/// seeks to absolute offset `SAMPLE_BLOCKS * i`.
///
/// The resulting walk re-reads overlapping head bytes. The offsets are part
/// of the fingerprint format: changing them changes which files compare
/// equal, so they must not be replaced with uniform `i * size / blocks`
/// spacing.
///
/// # Arguments
///
/// * `path` - The file to fingerprint
/// * `size` - Its size in bytes, already known from enumeration
///
/// # Errors
///
/// Returns a [`ProbeError`] if the file cannot be opened or read.
pub fn read_fingerprint(path: &Path, size: u64) -> Result<Vec<u8>, ProbeError> {
    let mut file = File::open(path).map_err(|e| ProbeError::from_io(path, e))?;

    if size <= FINGERPRINT_LEN as u64 {
        let mut buf = Vec::with_capacity(size as usize);
        file.read_to_end(&mut buf)
            .map_err(|e| ProbeError::from_io(path, e))?;
        return Ok(buf);
    }

    let block_len = (FINGERPRINT_LEN / SAMPLE_BLOCKS) as u64;
    let mut sample = Vec::with_capacity(FINGERPRINT_LEN);
    for i in 0..SAMPLE_BLOCKS {
        file.by_ref()
            .take(block_len)
            .read_to_end(&mut sample)
            .map_err(|e| ProbeError::from_io(path, e))?;
        file.seek(SeekFrom::Start((SAMPLE_BLOCKS * i) as u64))
            .map_err(|e| ProbeError::from_io(path, e))?;
    }
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_prefix_of_short_file_is_whole_content() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "short.bin", b"hello");
        assert_eq!(read_prefix(&path).unwrap(), b"hello");
    }

    #[test]
    fn test_prefix_is_capped() {
        let dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        let path = write_file(&dir, "long.bin", &content);

        let prefix = read_prefix(&path).unwrap();
        assert_eq!(prefix.len(), PREFIX_LEN);
        assert_eq!(prefix, content[..PREFIX_LEN]);
    }

    #[test]
    fn test_prefix_of_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "empty.bin", b"");
        assert!(read_prefix(&path).unwrap().is_empty());
    }

    #[test]
    fn test_fingerprint_of_small_file_is_whole_content() {
        let dir = TempDir::new().unwrap();
        let content = vec![7u8; 64];
        let path = write_file(&dir, "small.bin", &content);
        assert_eq!(read_fingerprint(&path, 64).unwrap(), content);
    }

    #[test]
    fn test_fingerprint_sample_layout() {
        let dir = TempDir::new().unwrap();
        let content: Vec<u8> = (0..200u8).collect();
        let path = write_file(&dir, "sampled.bin", &content);

        let fingerprint = read_fingerprint(&path, 200).unwrap();
        assert_eq!(fingerprint.len(), FINGERPRINT_LEN);

        // Pass 0 reads [0,16) then seeks to 0; pass 1 reads [0,16) again and
        // seeks to 4; pass 2 reads [4,20) and seeks to 8; pass 3 reads [8,24).
        let mut expected = Vec::new();
        expected.extend_from_slice(&content[0..16]);
        expected.extend_from_slice(&content[0..16]);
        expected.extend_from_slice(&content[4..20]);
        expected.extend_from_slice(&content[8..24]);
        assert_eq!(fingerprint, expected);
    }

    #[test]
    fn test_fingerprint_just_over_threshold() {
        let dir = TempDir::new().unwrap();
        let content = vec![3u8; 65];
        let path = write_file(&dir, "over.bin", &content);

        let fingerprint = read_fingerprint(&path, 65).unwrap();
        assert_eq!(fingerprint.len(), FINGERPRINT_LEN);
        assert!(fingerprint.iter().all(|&b| b == 3));
    }

    #[test]
    fn test_fingerprint_differs_in_head() {
        let dir = TempDir::new().unwrap();
        let mut a = vec![0u8; 100];
        let mut b = vec![0u8; 100];
        a[10] = 1;
        b[10] = 2;
        let path_a = write_file(&dir, "a.bin", &a);
        let path_b = write_file(&dir, "b.bin", &b);

        assert_ne!(
            read_fingerprint(&path_a, 100).unwrap(),
            read_fingerprint(&path_b, 100).unwrap()
        );
    }

    #[test]
    fn test_probe_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.bin");

        let err = read_prefix(&path).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound(_)));
        assert_eq!(err.path(), path.as_path());
    }
}
