//! Directory listing snapshots with filter, sort and aggregate views.
//!
//! A listing never changes after construction. Every filter and sort
//! returns a new vector, and sorts are stable so entries that compare equal
//! keep their enumeration order.

use std::time::SystemTime;

use crate::entry::FileSystemEntry;
use crate::error::{ModelError, Result};
use crate::size::FileSize;

/// Pattern that disables name filtering.
pub const MATCH_ALL: &str = "*";

/// The entries of one directory, captured at a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    path: String,
    entries: Vec<FileSystemEntry>,
    scanned_at: SystemTime,
    total_count: usize,
}

impl DirectoryListing {
    /// Create a listing for `path`. An empty entry vector is valid.
    pub fn new(path: impl Into<String>, entries: Vec<FileSystemEntry>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(ModelError::EmptyPath);
        }

        let total_count = entries.len();
        Ok(Self {
            path,
            entries,
            scanned_at: SystemTime::now(),
            total_count,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Entries in enumeration order.
    pub fn entries(&self) -> &[FileSystemEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<FileSystemEntry> {
        self.entries
    }

    pub fn scanned_at(&self) -> SystemTime {
        self.scanned_at
    }

    /// Entry count at construction.
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directories when `is_dir` is true, everything else otherwise.
    pub fn filter_by_type(&self, is_dir: bool) -> Vec<FileSystemEntry> {
        self.filtered(|entry| entry.is_dir() == is_dir)
    }

    /// Entries that are not hidden.
    pub fn filter_hidden(&self) -> Vec<FileSystemEntry> {
        self.filtered(|entry| !entry.is_hidden())
    }

    /// Entries whose name equals `pattern`. `"*"` and `""` match everything.
    pub fn filter_by_pattern(&self, pattern: &str) -> Vec<FileSystemEntry> {
        if pattern.is_empty() || pattern == MATCH_ALL {
            return self.entries.clone();
        }
        self.filtered(|entry| entry.name() == pattern)
    }

    /// Ascending by name.
    pub fn sort_by_name(&self) -> Vec<FileSystemEntry> {
        self.sorted(|a, b| a.name().cmp(b.name()))
    }

    /// Ascending by size.
    pub fn sort_by_size(&self) -> Vec<FileSystemEntry> {
        self.sorted(|a, b| a.size().cmp(&b.size()))
    }

    /// Newest first.
    pub fn sort_by_mod_time(&self) -> Vec<FileSystemEntry> {
        self.sorted(|a, b| b.mod_time().cmp(&a.mod_time()))
    }

    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.is_dir()).count()
    }

    pub fn directory_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_dir()).count()
    }

    /// Sum of file sizes; directories are not counted.
    pub fn total_size(&self) -> FileSize {
        let bytes = self
            .entries
            .iter()
            .filter(|entry| !entry.is_dir())
            .fold(0u64, |acc, entry| acc.saturating_add(entry.size().bytes()));
        FileSize::new(bytes)
    }

    fn filtered<F>(&self, keep: F) -> Vec<FileSystemEntry>
    where
        F: Fn(&FileSystemEntry) -> bool,
    {
        self.entries.iter().filter(|entry| keep(entry)).cloned().collect()
    }

    fn sorted<F>(&self, compare: F) -> Vec<FileSystemEntry>
    where
        F: FnMut(&FileSystemEntry, &FileSystemEntry) -> std::cmp::Ordering,
    {
        let mut entries = self.entries.clone();
        entries.sort_by(compare);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(name: &str, size: u64, secs: u64, is_dir: bool) -> FileSystemEntry {
        FileSystemEntry::new(
            name,
            name,
            FileSize::new(size),
            SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            is_dir,
            0o644,
        )
        .unwrap()
    }

    fn names(entries: &[FileSystemEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name()).collect()
    }

    fn sample() -> DirectoryListing {
        DirectoryListing::new(
            ".",
            vec![
                entry("b.txt", 20, 100, false),
                entry("a.txt", 10, 300, false),
                entry(".hidden", 5, 200, false),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_path_rejected() {
        assert_eq!(
            DirectoryListing::new("", Vec::new()).unwrap_err(),
            ModelError::EmptyPath
        );
    }

    #[test]
    fn test_empty_entries_valid() {
        let listing = DirectoryListing::new("empty", Vec::new()).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.total_count(), 0);
        assert_eq!(listing.total_size(), FileSize::ZERO);
    }

    #[test]
    fn test_sort_and_hidden_filter() {
        let listing = sample();
        assert_eq!(names(&listing.sort_by_name()), vec![".hidden", "a.txt", "b.txt"]);
        assert_eq!(names(&listing.filter_hidden()), vec!["b.txt", "a.txt"]);
        // Source order is untouched.
        assert_eq!(names(listing.entries()), vec!["b.txt", "a.txt", ".hidden"]);
    }

    #[test]
    fn test_sort_by_size() {
        let listing = sample();
        assert_eq!(names(&listing.sort_by_size()), vec![".hidden", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_sort_by_mod_time_newest_first() {
        let listing = sample();
        let sorted = listing.sort_by_mod_time();
        assert_eq!(names(&sorted), vec!["a.txt", ".hidden", "b.txt"]);
        assert!(sorted.windows(2).all(|w| w[0].mod_time() >= w[1].mod_time()));
        assert_eq!(sorted.len(), listing.total_count());
    }

    #[test]
    fn test_sorts_are_stable() {
        let listing = DirectoryListing::new(
            ".",
            vec![
                entry("x", 1, 50, false),
                entry("y", 1, 50, false),
                entry("z", 1, 50, false),
            ],
        )
        .unwrap();
        assert_eq!(names(&listing.sort_by_size()), vec!["x", "y", "z"]);
        assert_eq!(names(&listing.sort_by_mod_time()), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_filter_by_type() {
        let listing = DirectoryListing::new(
            ".",
            vec![entry("docs", 4096, 1, true), entry("a.txt", 3, 1, false)],
        )
        .unwrap();
        assert_eq!(names(&listing.filter_by_type(true)), vec!["docs"]);
        assert_eq!(names(&listing.filter_by_type(false)), vec!["a.txt"]);
        assert_eq!(listing.directory_count(), 1);
        assert_eq!(listing.file_count(), 1);
        // Directory sizes are excluded.
        assert_eq!(listing.total_size(), FileSize::new(3));
    }

    #[test]
    fn test_filter_by_pattern() {
        let listing = sample();
        assert_eq!(listing.filter_by_pattern("*").len(), 3);
        assert_eq!(listing.filter_by_pattern("").len(), 3);
        assert_eq!(names(&listing.filter_by_pattern("a.txt")), vec!["a.txt"]);
        assert!(listing.filter_by_pattern("*.txt").is_empty());
    }
}
