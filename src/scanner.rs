//! Stale log file discovery.
//!
//! Lists candidate files directly under the log root and classifies each by
//! the calendar date of its last modification: anything dated before today
//! is stale and eligible for archival. The date embedded in a rotated
//! file's name is deliberately not consulted; the filesystem timestamp is
//! authoritative, so a file touched after midnight counts as active even
//! when its content belongs to the previous day.

use chrono::{DateTime, Local, NaiveDate};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LogConfig;

/// A rotated log file whose last-modified date precedes today.
#[derive(Debug, Clone)]
pub struct StaleLogFile {
    pub path: PathBuf,
    /// Calendar date of the file's last modification, in local time.
    pub modified_on: NaiveDate,
}

/// List stale log files under `root`, judged against today's local date.
pub fn stale_files(root: &Path, config: &LogConfig) -> Vec<StaleLogFile> {
    stale_files_at(root, config, Local::now().date_naive())
}

/// List stale log files under `root`, judged against an explicit `today`.
///
/// Recomputed fresh on every call; nothing is cached. A missing root yields
/// an empty list rather than an error, and unreadable entries are skipped
/// with a warning on stderr so one bad file cannot abort the sweep.
pub fn stale_files_at(root: &Path, config: &LogConfig, today: NaiveDate) -> Vec<StaleLogFile> {
    let mut stale = Vec::new();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return stale, // Root doesn't exist or not readable
    };

    for entry in entries.flatten() {
        let path = entry.path();

        // Skip directories; the archive subtree lives below the root but
        // never matches here.
        if path.is_dir() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !matches_active_pattern(name, config) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(err) => {
                eprintln!("logkeeper: cannot stat {}: {err}", path.display());
                continue;
            }
        };

        let modified_on = DateTime::<Local>::from(modified).date_naive();
        if modified_on < today {
            stale.push(StaleLogFile { path, modified_on });
        }
    }

    // Sort by path for consistent ordering
    stale.sort_by(|a, b| a.path.cmp(&b.path));
    stale
}

fn matches_active_pattern(name: &str, config: &LogConfig) -> bool {
    name.starts_with(&config.file_prefix) && name.ends_with(&format!(".{}", config.file_suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn tomorrow() -> NaiveDate {
        Local::now().date_naive().succ_opt().unwrap()
    }

    #[test]
    fn test_files_modified_today_are_active() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("log.txt")).unwrap();
        File::create(dir.path().join("log.2024-01-01.txt")).unwrap();

        let today = Local::now().date_naive();
        let stale = stale_files_at(dir.path(), &LogConfig::default(), today);

        // Both were just written, so their mtime date is today regardless
        // of the date in the name.
        assert!(stale.is_empty());
    }

    #[test]
    fn test_files_modified_before_today_are_stale() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("log.txt")).unwrap();
        File::create(dir.path().join("log.2024-01-01.txt")).unwrap();

        let stale = stale_files_at(dir.path(), &LogConfig::default(), tomorrow());
        assert_eq!(stale.len(), 2);
        assert_eq!(stale[0].modified_on, Local::now().date_naive());
    }

    #[test]
    fn test_non_matching_names_are_ignored() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("other.txt")).unwrap();
        File::create(dir.path().join("log.2024-01-01.log")).unwrap();
        File::create(dir.path().join("readme.md")).unwrap();

        let stale = stale_files_at(dir.path(), &LogConfig::default(), tomorrow());
        assert!(stale.is_empty());
    }

    #[test]
    fn test_subdirectories_are_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("archive")).unwrap();
        // Even a directory named like a log file is not a candidate
        fs::create_dir(dir.path().join("log.2024-01-01.txt")).unwrap();

        let stale = stale_files_at(dir.path(), &LogConfig::default(), tomorrow());
        assert!(stale.is_empty());
    }

    #[test]
    fn test_missing_root_yields_empty() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let stale = stale_files_at(&missing, &LogConfig::default(), tomorrow());
        assert!(stale.is_empty());
    }

    #[test]
    fn test_results_are_sorted_by_path() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("log.2024-01-02.txt")).unwrap();
        File::create(dir.path().join("log.2024-01-01.txt")).unwrap();

        let stale = stale_files_at(dir.path(), &LogConfig::default(), tomorrow());
        assert_eq!(stale.len(), 2);
        assert!(stale[0].path < stale[1].path);
    }
}
