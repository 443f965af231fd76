// Thu Jan 22 2026 - Alex

use chrono::{DateTime, Local};
use log::{info, trace};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Asked once per directory entry; returning false aborts the scan.
pub trait ScanProbe {
    fn keep_scanning(&mut self) -> bool;
}

/// A cooperatively cancellable search for `pattern` below `root`.
pub trait ScanTask {
    fn run(&mut self, pattern: &str, root: &Path, probe: &mut dyn ScanProbe) -> ScanOutcome;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchRecord {
    pub timestamp: DateTime<Local>,
    pub kind: EntryKind,
    pub full_path: PathBuf,
    pub pattern: String,
}

impl MatchRecord {
    pub fn now(kind: EntryKind, full_path: &Path, pattern: &str) -> Self {
        Self {
            timestamp: Local::now(),
            kind,
            full_path: full_path.to_path_buf(),
            pattern: pattern.to_string(),
        }
    }
}

impl fmt::Display for MatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "found {}: date: {} full_path: {} pattern: {}",
            self.kind,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.full_path.display(),
            self.pattern
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub visited: usize,
    pub matches: usize,
    /// False when the probe cut the walk short.
    pub completed: bool,
}

/// Depth-first walk of the real filesystem.
///
/// Only regular files and directories are compared, links are not followed
/// and unreadable directories are skipped along with their subtree.
#[derive(Debug, Default)]
pub struct FsScan {
    keep_records: bool,
    records: Vec<MatchRecord>,
}

impl FsScan {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_records(mut self, keep: bool) -> Self {
        self.keep_records = keep;
        self
    }

    #[cfg(test)]
    pub(crate) fn take_records(&mut self) -> Vec<MatchRecord> {
        std::mem::take(&mut self.records)
    }
}

impl ScanTask for FsScan {
    fn run(&mut self, pattern: &str, root: &Path, probe: &mut dyn ScanProbe) -> ScanOutcome {
        trace!("started searching for: {}", pattern);
        let mut outcome = ScanOutcome::default();

        let walker = WalkDir::new(root).follow_links(false).min_depth(1);
        for entry in walker {
            if !probe.keep_scanning() {
                return outcome;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!("skipping unreadable path: {}", e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                continue;
            };

            outcome.visited += 1;
            let name = entry.file_name().to_string_lossy();
            trace!(
                "{} compare: name {} searched_pattern {} in {}",
                kind,
                name,
                pattern,
                entry.path().parent().unwrap_or(root).display()
            );

            if name.contains(pattern) {
                let record = MatchRecord::now(kind, entry.path(), pattern);
                info!("{}", record);
                outcome.matches += 1;
                if self.keep_records {
                    self.records.push(record);
                }
            }
        }

        outcome.completed = true;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Budget(usize);

    impl ScanProbe for Budget {
        fn keep_scanning(&mut self) -> bool {
            if self.0 == 0 {
                return false;
            }
            self.0 -= 1;
            true
        }
    }

    fn tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("alpha/beta_dir")).unwrap();
        fs::create_dir_all(dir.path().join("gamma")).unwrap();
        fs::write(dir.path().join("alpha/beta.txt"), b"x").unwrap();
        fs::write(dir.path().join("alpha/beta_dir/deep_beta"), b"x").unwrap();
        fs::write(dir.path().join("gamma/other.txt"), b"x").unwrap();
        dir
    }

    #[test]
    fn test_matches_files_and_directories_by_substring() {
        let dir = tree();
        let mut scan = FsScan::new().with_records(true);

        let outcome = scan.run("beta", dir.path(), &mut Budget(usize::MAX));

        assert!(outcome.completed);
        assert_eq!(outcome.visited, 6);
        assert_eq!(outcome.matches, 3);

        let mut found: Vec<(EntryKind, PathBuf)> = scan
            .take_records()
            .into_iter()
            .map(|r| (r.kind, r.full_path))
            .collect();
        found.sort();
        let mut expected = vec![
            (EntryKind::File, dir.path().join("alpha/beta.txt")),
            (EntryKind::Directory, dir.path().join("alpha/beta_dir")),
            (EntryKind::File, dir.path().join("alpha/beta_dir/deep_beta")),
        ];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_probe_aborts_scan() {
        let dir = tree();
        let mut scan = FsScan::new();

        let outcome = scan.run("beta", dir.path(), &mut Budget(2));

        assert!(!outcome.completed);
        assert_eq!(outcome.visited, 2);
    }

    #[test]
    fn test_probe_checked_before_first_entry() {
        let dir = tree();
        let outcome = FsScan::new().run("beta", dir.path(), &mut Budget(0));
        assert_eq!(outcome, ScanOutcome::default());
    }

    #[test]
    fn test_missing_root_completes_empty() {
        let dir = TempDir::new().unwrap();
        let outcome = FsScan::new().run("x", &dir.path().join("missing"), &mut Budget(usize::MAX));

        assert!(outcome.completed);
        assert_eq!(outcome.visited, 0);
    }

    #[test]
    fn test_match_record_line() {
        let record = MatchRecord::now(EntryKind::Directory, Path::new("/srv/beta"), "beta");
        let line = record.to_string();

        assert!(line.starts_with("found directory: date: "));
        assert!(line.ends_with(" full_path: /srv/beta pattern: beta"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "directory");
        assert_eq!(json["pattern"], "beta");
    }
}
