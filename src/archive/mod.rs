//! Monthly archival of stale log files.
//!
//! Each stale daily file is folded into its month's container at
//! `<root>/archive/<YYYY>/<MM>/<YYYY>-<MM>.zip` under a day-keyed entry
//! (`<DD>.<ext>`), and the source file is deleted only once the rewritten
//! container is durably in place. Containers are created lazily, grow one
//! day at a time, and are never deleted here.

pub mod container;

use anyhow::{Context, Result};
use chrono::Datelike;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;
use crate::scanner::StaleLogFile;

pub use container::{ArchiveContainer, ContainerError, ZipContainer};

/// Subdirectory of the log root holding monthly containers.
pub const ARCHIVE_DIR: &str = "archive";

/// Container file extension.
const CONTAINER_EXT: &str = "zip";

/// Outcome of one archival sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveSummary {
    /// Files folded into their monthly container and removed.
    pub archived: usize,
    /// Files skipped after a failure; left in place for the next run.
    pub skipped: usize,
}

/// Path of the monthly container for a (year, month) pair.
pub fn container_path(root: &Path, year: i32, month: u32) -> PathBuf {
    root.join(ARCHIVE_DIR)
        .join(format!("{year:04}"))
        .join(format!("{month:02}"))
        .join(format!("{year:04}-{month:02}.{CONTAINER_EXT}"))
}

/// Entry name for a day-of-month within a monthly container.
fn entry_name(day: u32, suffix: &str) -> String {
    format!("{day:02}.{suffix}")
}

/// Archive every file in `stale`, isolating failures per file.
///
/// Failures are reported on stderr (the structured sink is not configured
/// yet when this runs at startup) and leave the source file untouched, so
/// it stays a candidate for the next run. One bad file never aborts the
/// rest of the sweep.
pub fn archive_stale_files(root: &Path, stale: &[StaleLogFile], suffix: &str) -> ArchiveSummary {
    let mut summary = ArchiveSummary::default();

    for file in stale {
        match archive_file::<ZipContainer>(root, file, suffix) {
            Ok(()) => summary.archived += 1,
            Err(err) => {
                summary.skipped += 1;
                eprintln!(
                    "logkeeper: failed to archive {}: {err:#}",
                    file.path.display()
                );
            }
        }
    }

    summary
}

/// Fold one stale file into its monthly container, then delete the source.
///
/// Re-running for the same file is idempotent: an existing entry for that
/// day is replaced, never duplicated.
pub fn archive_file<C: ArchiveContainer>(
    root: &Path,
    file: &StaleLogFile,
    suffix: &str,
) -> Result<()> {
    let year = file.modified_on.year();
    let month = file.modified_on.month();
    let day = file.modified_on.day();

    let container = container_path(root, year, month);
    if let Some(parent) = container.parent() {
        paths::ensure_dir(parent)?;
    }

    let content = fs::read(&file.path)
        .with_context(|| format!("Failed to read {}", file.path.display()))?;

    let mut archive = C::open(&container)
        .with_context(|| format!("Failed to open container {}", container.display()))?;

    let entry = entry_name(day, suffix);
    archive.remove_entry(&entry);
    archive.put_entry(&entry, content);
    archive
        .commit()
        .with_context(|| format!("Failed to write container {}", container.display()))?;

    // The source only goes away once the container write is durable, so a
    // crash in between leaves the file as a candidate for the next run.
    fs::remove_file(&file.path)
        .with_context(|| format!("Failed to remove archived source {}", file.path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn stale(path: PathBuf, year: i32, month: u32, day: u32) -> StaleLogFile {
        StaleLogFile {
            path,
            modified_on: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        }
    }

    fn read_entry(container: &Path, name: &str) -> Vec<u8> {
        ZipContainer::open(container).unwrap().read_entry(name).unwrap()
    }

    #[test]
    fn test_archives_file_under_month_container() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let source = root.join("log.2024-01-02.txt");
        fs::write(&source, "second day").unwrap();

        archive_file::<ZipContainer>(root, &stale(source.clone(), 2024, 1, 2), "txt").unwrap();

        assert!(!source.exists());
        let container = container_path(root, 2024, 1);
        assert!(container.exists());
        assert_eq!(read_entry(&container, "02.txt"), b"second day");
    }

    #[test]
    fn test_rearchiving_same_day_replaces_entry() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let source = root.join("log.2024-01-02.txt");

        fs::write(&source, "first attempt").unwrap();
        archive_file::<ZipContainer>(root, &stale(source.clone(), 2024, 1, 2), "txt").unwrap();

        // Simulate a restart that re-produces the same day's file
        fs::write(&source, "second attempt").unwrap();
        archive_file::<ZipContainer>(root, &stale(source.clone(), 2024, 1, 2), "txt").unwrap();

        let container = ZipContainer::open(&container_path(root, 2024, 1)).unwrap();
        assert_eq!(container.entry_names(), vec!["02.txt"]);
        assert_eq!(container.read_entry("02.txt").unwrap(), b"second attempt");
    }

    #[test]
    fn test_days_of_one_month_share_a_container() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        for day in 1..=3u32 {
            let source = root.join(format!("log.2024-01-{day:02}.txt"));
            fs::write(&source, format!("day {day}")).unwrap();
            archive_file::<ZipContainer>(root, &stale(source, 2024, 1, day), "txt").unwrap();
        }

        let container = ZipContainer::open(&container_path(root, 2024, 1)).unwrap();
        assert_eq!(container.entry_names(), vec!["01.txt", "02.txt", "03.txt"]);
    }

    #[test]
    fn test_months_get_separate_containers() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let january = root.join("log.2024-01-31.txt");
        fs::write(&january, "january").unwrap();
        let february = root.join("log.2024-02-01.txt");
        fs::write(&february, "february").unwrap();

        let summary = archive_stale_files(
            root,
            &[stale(january, 2024, 1, 31), stale(february, 2024, 2, 1)],
            "txt",
        );

        assert_eq!(summary.archived, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(read_entry(&container_path(root, 2024, 1), "31.txt"), b"january");
        assert_eq!(read_entry(&container_path(root, 2024, 2), "01.txt"), b"february");
    }

    #[test]
    fn test_one_bad_file_does_not_block_the_rest() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        // A candidate that cannot be read: the path is a directory
        let unreadable = root.join("log.2024-01-05.txt");
        fs::create_dir(&unreadable).unwrap();

        let good = root.join("log.2024-01-06.txt");
        fs::write(&good, "good").unwrap();

        let summary = archive_stale_files(
            root,
            &[
                stale(unreadable.clone(), 2024, 1, 5),
                stale(good.clone(), 2024, 1, 6),
            ],
            "txt",
        );

        assert_eq!(summary.archived, 1);
        assert_eq!(summary.skipped, 1);
        // The failed candidate is left in place for the next run
        assert!(unreadable.exists());
        assert!(!good.exists());

        let container = ZipContainer::open(&container_path(root, 2024, 1)).unwrap();
        assert_eq!(container.entry_names(), vec!["06.txt"]);
    }

    #[test]
    fn test_corrupt_container_skips_file_and_keeps_source() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let container = container_path(root, 2024, 1);
        fs::create_dir_all(container.parent().unwrap()).unwrap();
        fs::write(&container, "garbage, not a zip").unwrap();

        let source = root.join("log.2024-01-02.txt");
        fs::write(&source, "content").unwrap();

        let summary = archive_stale_files(root, &[stale(source.clone(), 2024, 1, 2)], "txt");

        assert_eq!(summary.archived, 0);
        assert_eq!(summary.skipped, 1);
        assert!(source.exists());
    }

    // The startup scenario from the service's point of view: an active file
    // plus two stale files from early January.
    #[test]
    fn test_startup_scenario_archives_only_stale_files() {
        let dir = tempdir().unwrap();
        let root = dir.path();

        let active = root.join("log.txt");
        fs::write(&active, "today's log").unwrap();
        let first = root.join("log.2024-01-01.txt");
        fs::write(&first, "january first").unwrap();
        let second = root.join("log.2024-01-02.txt");
        fs::write(&second, "january second").unwrap();

        // The scanner never yields the active file; only the stale ones
        // reach the writer.
        let summary = archive_stale_files(
            root,
            &[stale(first.clone(), 2024, 1, 1), stale(second.clone(), 2024, 1, 2)],
            "txt",
        );

        assert_eq!(summary.archived, 2);
        assert!(active.exists());
        assert!(!first.exists());
        assert!(!second.exists());

        let container = ZipContainer::open(&container_path(root, 2024, 1)).unwrap();
        assert_eq!(container.entry_names(), vec!["01.txt", "02.txt"]);
        assert_eq!(container.read_entry("01.txt").unwrap(), b"january first");
        assert_eq!(container.read_entry("02.txt").unwrap(), b"january second");
    }
}
