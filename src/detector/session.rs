//! Detector session: the staged index state for one scan.

use std::collections::HashMap;
use std::path::PathBuf;

use super::probe::{read_fingerprint, read_prefix, ProbeError};
use super::{DuplicateRecord, Stage};
use crate::scanner::FileEntry;

/// Index key scoping a byte probe to one size bucket.
///
/// Files of different sizes can share leading bytes or a sampled
/// fingerprint; folding the size into the key keeps such files from ever
/// being paired.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ProbeKey {
    size: u64,
    bytes: Vec<u8>,
}

impl ProbeKey {
    fn new(size: u64, bytes: Vec<u8>) -> Self {
        Self { size, bytes }
    }
}

/// Verdict for a single processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The file is (provisionally) unique; the stage tells which probe
    /// separated it from everything seen so far.
    Unique(Stage),
    /// The file duplicates an earlier-seen file.
    Duplicate(DuplicateRecord),
}

/// State of one detection run: three indices that grow as files are
/// processed and are discarded with the session.
///
/// Each index stores the first-seen file for a key; later files colliding on
/// that key are compared against it, never the other way around. Entries are
/// never overwritten.
///
/// # Example
///
/// ```no_run
/// use photodupe::detector::{DetectorSession, Verdict};
/// use photodupe::scanner::FileEntry;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let mut session = DetectorSession::new();
/// let file = FileEntry::new(PathBuf::from("photo.jpg"), 1024, SystemTime::now());
/// match session.process(&file) {
///     Ok(Verdict::Unique(stage)) => println!("unique at {:?}", stage),
///     Ok(Verdict::Duplicate(rec)) => println!("copy of {}", rec.original.display()),
///     Err(e) => eprintln!("skipped: {}", e),
/// }
/// ```
#[derive(Debug, Default)]
pub struct DetectorSession {
    /// byte size -> first file seen at that size
    size_index: HashMap<u64, PathBuf>,
    /// (size, leading bytes) -> representative file
    prefix_index: HashMap<ProbeKey, PathBuf>,
    /// (size, sparse sample) -> representative file
    fingerprint_index: HashMap<ProbeKey, PathBuf>,
}

impl DetectorSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one file against everything processed so far.
    ///
    /// Walks the funnel stage by stage: a file stops at the first stage whose
    /// index does not already contain its key, registering itself as the
    /// representative for that key. Only a file whose size, prefix, and
    /// fingerprint all collide with earlier files is declared a duplicate.
    ///
    /// # Errors
    ///
    /// Returns a [`ProbeError`] when the file, or the earlier-seen file it
    /// must be compared against, cannot be read. No verdict is recorded for
    /// the current file in that case; the session stays consistent and later
    /// files are unaffected.
    pub fn process(&mut self, file: &FileEntry) -> Result<Verdict, ProbeError> {
        let size = file.size;

        // Stage 1: size. The first file of a size is the anchor for all
        // later files of that size.
        let anchor = match self.size_index.get(&size) {
            Some(anchor) => anchor.clone(),
            None => {
                self.size_index.insert(size, file.path.clone());
                return Ok(Verdict::Unique(Stage::Size));
            }
        };

        // Stage 2: leading bytes. The anchor's prefix is promoted into the
        // index lazily, the first time its size collides.
        let anchor_prefix = read_prefix(&anchor)?;
        let own_prefix = read_prefix(&file.path)?;
        self.prefix_index
            .entry(ProbeKey::new(size, anchor_prefix))
            .or_insert_with(|| anchor.clone());

        let own_key = ProbeKey::new(size, own_prefix);
        let prefix_rep = match self.prefix_index.get(&own_key) {
            Some(rep) => rep.clone(),
            None => {
                self.prefix_index.insert(own_key, file.path.clone());
                return Ok(Verdict::Unique(Stage::Prefix));
            }
        };

        // Stage 3: sparse fingerprint, against the file registered for our
        // prefix.
        let rep_fingerprint = read_fingerprint(&prefix_rep, size)?;
        let own_fingerprint = read_fingerprint(&file.path, size)?;
        self.fingerprint_index
            .entry(ProbeKey::new(size, rep_fingerprint))
            .or_insert_with(|| prefix_rep.clone());

        let own_key = ProbeKey::new(size, own_fingerprint);
        match self.fingerprint_index.get(&own_key) {
            Some(original) => Ok(Verdict::Duplicate(DuplicateRecord {
                path: file.path.clone(),
                original: original.clone(),
                size,
            })),
            None => {
                self.fingerprint_index.insert(own_key, file.path.clone());
                Ok(Verdict::Unique(Stage::Fingerprint))
            }
        }
    }

    /// Number of distinct sizes seen so far.
    #[must_use]
    pub fn sizes_seen(&self) -> usize {
        self.size_index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn entry(dir: &TempDir, name: &str, content: &[u8]) -> FileEntry {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        FileEntry::new(path, content.len() as u64, SystemTime::now())
    }

    fn expect_unique(session: &mut DetectorSession, file: &FileEntry, stage: Stage) {
        match session.process(file).unwrap() {
            Verdict::Unique(s) => assert_eq!(s, stage, "{}", file.path.display()),
            Verdict::Duplicate(rec) => panic!("unexpected duplicate: {:?}", rec),
        }
    }

    fn expect_duplicate(session: &mut DetectorSession, file: &FileEntry, original: &FileEntry) {
        match session.process(file).unwrap() {
            Verdict::Duplicate(rec) => {
                assert_eq!(rec.path, file.path);
                assert_eq!(rec.original, original.path);
                assert_eq!(rec.size, file.size);
            }
            Verdict::Unique(stage) => panic!(
                "expected duplicate of {}, got unique at {:?}",
                original.path.display(),
                stage
            ),
        }
    }

    #[test]
    fn test_identical_small_files() {
        let dir = TempDir::new().unwrap();
        let f1 = entry(&dir, "f1", b"aaaaaaaaaa");
        let f2 = entry(&dir, "f2", b"aaaaaaaaaa");
        let f3 = entry(&dir, "f3", b"bbbbbbbbbb");

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_duplicate(&mut session, &f2, &f1);
        expect_unique(&mut session, &f3, Stage::Prefix);
    }

    #[test]
    fn test_identical_large_files() {
        let dir = TempDir::new().unwrap();
        let content = vec![0x5au8; 5000];
        let f1 = entry(&dir, "f1", &content);
        let f2 = entry(&dir, "f2", &content);

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_duplicate(&mut session, &f2, &f1);
    }

    #[test]
    fn test_same_size_different_prefix() {
        let dir = TempDir::new().unwrap();
        let mut a = vec![1u8; 5000];
        let mut b = vec![1u8; 5000];
        a[0] = 10;
        b[0] = 20;
        let f1 = entry(&dir, "f1", &a);
        let f2 = entry(&dir, "f2", &b);

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_unique(&mut session, &f2, Stage::Prefix);
    }

    #[test]
    fn test_same_prefix_tail_difference_is_not_observed() {
        // The fingerprint walk only samples head bytes, so two files that
        // agree on size and prefix but differ past the prefix still compare
        // equal. Defined behavior of the sampling scheme.
        let dir = TempDir::new().unwrap();
        let mut a = vec![9u8; 5000];
        let mut b = vec![9u8; 5000];
        a[4999] = 1;
        b[4999] = 2;
        let f1 = entry(&dir, "f1", &a);
        let f2 = entry(&dir, "f2", &b);

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_duplicate(&mut session, &f2, &f1);
    }

    #[test]
    fn test_first_seen_wins_for_three_copies() {
        let dir = TempDir::new().unwrap();
        let f1 = entry(&dir, "f1", b"same content here");
        let f2 = entry(&dir, "f2", b"same content here");
        let f3 = entry(&dir, "f3", b"same content here");

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_duplicate(&mut session, &f2, &f1);
        expect_duplicate(&mut session, &f3, &f1);
    }

    #[test]
    fn test_original_is_first_file_with_that_content() {
        let dir = TempDir::new().unwrap();
        let f1 = entry(&dir, "f1", b"cccccccccc");
        let f2 = entry(&dir, "f2", b"dddddddddd");
        let f3 = entry(&dir, "f3", b"dddddddddd");

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_unique(&mut session, &f2, Stage::Prefix);
        expect_duplicate(&mut session, &f3, &f2);
    }

    #[test]
    fn test_zero_byte_files_are_duplicates() {
        let dir = TempDir::new().unwrap();
        let f1 = entry(&dir, "f1", b"");
        let f2 = entry(&dir, "f2", b"");

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        expect_duplicate(&mut session, &f2, &f1);
    }

    #[test]
    fn test_different_sizes_never_pair() {
        let dir = TempDir::new().unwrap();
        // Two size buckets whose members share their first 2048 bytes across
        // buckets. Within each bucket the pairs genuinely match; across
        // buckets nothing may pair.
        let head = vec![0xabu8; 2048];
        let mut small = head.clone();
        small.extend_from_slice(&[1u8; 952]);
        let mut large = head.clone();
        large.extend_from_slice(&[2u8; 1952]);

        let s1 = entry(&dir, "s1", &small);
        let s2 = entry(&dir, "s2", &small);
        let l1 = entry(&dir, "l1", &large);
        let l2 = entry(&dir, "l2", &large);

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &s1, Stage::Size);
        expect_duplicate(&mut session, &s2, &s1);
        expect_unique(&mut session, &l1, Stage::Size);
        expect_duplicate(&mut session, &l2, &l1);
    }

    #[test]
    fn test_unreadable_file_reports_error() {
        let dir = TempDir::new().unwrap();
        let f1 = entry(&dir, "f1", b"0123456789");
        let mut missing = entry(&dir, "f2", b"0123456789");
        fs::remove_file(&missing.path).unwrap();
        missing.size = 10;

        let mut session = DetectorSession::new();
        expect_unique(&mut session, &f1, Stage::Size);
        assert!(session.process(&missing).is_err());

        // The session keeps working for readable files.
        let f3 = entry(&dir, "f3", b"0123456789");
        expect_duplicate(&mut session, &f3, &f1);
    }

    #[test]
    fn test_sizes_seen() {
        let dir = TempDir::new().unwrap();
        let f1 = entry(&dir, "f1", b"abc");
        let f2 = entry(&dir, "f2", b"defg");

        let mut session = DetectorSession::new();
        session.process(&f1).unwrap();
        session.process(&f2).unwrap();
        assert_eq!(session.sizes_seen(), 2);
    }
}
