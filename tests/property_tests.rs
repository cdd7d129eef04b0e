//! Property tests for the detection funnel.
//!
//! For files of at most 64 bytes both the prefix and the fingerprint cover
//! the whole file, so the funnel degenerates to exact content equality and
//! verdicts can be checked against a simple first-seen-by-content model.

use photodupe::detector::{detect, DetectorConfig};
use photodupe::scanner::FileEntry;
use proptest::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;
use tempfile::TempDir;

/// Write the contents as files and return entries in input order.
fn materialize(dir: &TempDir, contents: &[Vec<u8>]) -> Vec<FileEntry> {
    contents
        .iter()
        .enumerate()
        .map(|(i, content)| {
            let path = dir.path().join(format!("file_{i:03}.bin"));
            fs::write(&path, content).unwrap();
            FileEntry::new(path, content.len() as u64, SystemTime::now())
        })
        .collect()
}

/// First-seen-by-content model: every file whose exact content appeared
/// before is a duplicate of the earliest file with that content.
fn expected_pairs(entries: &[FileEntry], contents: &[Vec<u8>]) -> Vec<(PathBuf, PathBuf)> {
    let mut first_seen: HashMap<&[u8], &PathBuf> = HashMap::new();
    let mut pairs = Vec::new();
    for (entry, content) in entries.iter().zip(contents) {
        match first_seen.get(content.as_slice()) {
            Some(original) => pairs.push((entry.path.clone(), (*original).clone())),
            None => {
                first_seen.insert(content.as_slice(), &entry.path);
            }
        }
    }
    pairs
}

fn content_strategy() -> impl Strategy<Value = Vec<Vec<u8>>> {
    // Lengths up to 64 bytes keep every probe equal to the whole file.
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..65), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_detect_matches_first_seen_model(contents in content_strategy()) {
        let dir = TempDir::new().unwrap();
        let entries = materialize(&dir, &contents);

        let (records, stats) = detect(&entries, &DetectorConfig::default());

        let actual: Vec<(PathBuf, PathBuf)> = records
            .iter()
            .map(|r| (r.path.clone(), r.original.clone()))
            .collect();
        prop_assert_eq!(actual, expected_pairs(&entries, &contents));
        prop_assert_eq!(stats.total_files, entries.len());
        prop_assert_eq!(stats.duplicates, records.len());
        prop_assert_eq!(stats.failed_files, 0);
    }

    #[test]
    fn prop_records_always_pair_equal_sizes(contents in content_strategy()) {
        let dir = TempDir::new().unwrap();
        let entries = materialize(&dir, &contents);

        let (records, _) = detect(&entries, &DetectorConfig::default());

        for record in &records {
            let dup_len = fs::metadata(&record.path).unwrap().len();
            let orig_len = fs::metadata(&record.original).unwrap().len();
            prop_assert_eq!(dup_len, record.size);
            prop_assert_eq!(orig_len, record.size);
            // Each pair is reported in one direction only.
            prop_assert!(!records
                .iter()
                .any(|r| r.path == record.original && r.original == record.path));
        }
    }

    #[test]
    fn prop_rerun_yields_identical_records(contents in content_strategy()) {
        let dir = TempDir::new().unwrap();
        let entries = materialize(&dir, &contents);

        let (first, _) = detect(&entries, &DetectorConfig::default());
        let (second, _) = detect(&entries, &DetectorConfig::default());
        prop_assert_eq!(first, second);
    }
}
