//! Symlink tree construction for dated photos.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use super::SortError;

/// Result of one linking pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkOutcome {
    /// Files linked into the tree
    pub linked: usize,
    /// Files left for the next pass (no date, or link failure)
    pub unsorted: Vec<PathBuf>,
}

/// Link each dated file into `dest/year/month/`.
///
/// `dates` is parallel to `files`; undated files land in the outcome's
/// `unsorted` list. A name collision inside a month folder is retried once
/// with the file's pass index appended, matching names like `img.jpg` and
/// `img.jpg3`. Files whose link cannot be created are logged and counted as
/// unsorted.
///
/// # Errors
///
/// Returns a [`SortError`] when a year/month directory cannot be created.
pub fn link_into_tree(
    dest: &Path,
    files: &[PathBuf],
    dates: &[Option<NaiveDate>],
) -> Result<LinkOutcome, SortError> {
    debug_assert_eq!(files.len(), dates.len());

    let mut outcome = LinkOutcome::default();

    for (i, (file, date)) in files.iter().zip(dates).enumerate() {
        let Some(date) = date else {
            outcome.unsorted.push(file.clone());
            continue;
        };

        let month_dir = dest
            .join(date.year().to_string())
            .join(date.month().to_string());
        fs::create_dir_all(&month_dir).map_err(|e| SortError::Io {
            path: month_dir.clone(),
            source: e,
        })?;

        let basename = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("file{i}"));

        let mut link = month_dir.join(&basename);
        if link.exists() {
            link = month_dir.join(format!("{basename}{i}"));
        }

        match symlink(file, &link) {
            Ok(()) => outcome.linked += 1,
            Err(e) => {
                log::warn!("Failed to link {} -> {}: {}", link.display(), file.display(), e);
                outcome.unsorted.push(file.clone());
            }
        }
    }

    Ok(outcome)
}

#[cfg(unix)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

#[cfg(windows)]
fn symlink(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(original, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, b"pixels").unwrap();
        path
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        Some(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_links_land_in_year_month_folders() {
        let photos = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let a = touch(&photos, "a.jpg");
        let b = touch(&photos, "b.jpg");

        let outcome = link_into_tree(
            dest.path(),
            &[a.clone(), b],
            &[date(2019, 6, 12), date(2020, 11, 2)],
        )
        .unwrap();

        assert_eq!(outcome.linked, 2);
        let link = dest.path().join("2019").join("6").join("a.jpg");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), a);
        assert!(dest.path().join("2020").join("11").join("b.jpg").exists());
    }

    #[test]
    fn test_undated_files_are_left_unsorted() {
        let photos = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let a = touch(&photos, "a.jpg");
        let b = touch(&photos, "b.jpg");

        let outcome =
            link_into_tree(dest.path(), &[a, b.clone()], &[date(2019, 6, 12), None]).unwrap();

        assert_eq!(outcome.linked, 1);
        assert_eq!(outcome.unsorted, vec![b]);
    }

    #[test]
    fn test_name_collision_gets_index_suffix() {
        let photos_a = TempDir::new().unwrap();
        let photos_b = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let first = touch(&photos_a, "img.jpg");
        let second = touch(&photos_b, "img.jpg");

        let outcome = link_into_tree(
            dest.path(),
            &[first, second.clone()],
            &[date(2019, 6, 12), date(2019, 6, 13)],
        )
        .unwrap();

        assert_eq!(outcome.linked, 2);
        let month = dest.path().join("2019").join("6");
        assert!(month.join("img.jpg").exists());
        let suffixed = month.join("img.jpg1");
        assert_eq!(fs::read_link(&suffixed).unwrap(), second);
    }

    #[test]
    fn test_empty_input() {
        let dest = TempDir::new().unwrap();
        let outcome = link_into_tree(dest.path(), &[], &[]).unwrap();
        assert_eq!(outcome, LinkOutcome::default());
    }
}
