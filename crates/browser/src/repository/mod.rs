//! Filesystem access confined to a single root directory.
//!
//! [`FileSystemRepository`] is the boundary where a validated [`FilePath`]
//! becomes a real filesystem operation. Implementations hold only immutable
//! configuration and re-check containment on every call.
//!
//! # Security
//!
//! Paths are validated twice. [`FilePath`] rejects traversal patterns at the
//! string level; the repository then resolves the path against the root,
//! canonicalizes it (following symlinks) and rejects anything whose
//! canonical form is not a descendant of the canonical root.

pub mod local;
pub mod memory;

use model::{DirectoryListing, FileContent, FilePath, FileSize, FileSystemEntry};

use crate::error::RepositoryResult;

pub use local::LocalRepository;
pub use memory::MemoryRepository;

/// Operation names recorded in [`RepositoryError`](crate::RepositoryError).
pub mod ops {
    pub const LIST: &str = "list";
    pub const READ: &str = "read";
    pub const STAT: &str = "stat";
    pub const EXISTS: &str = "exists";
    pub const VALIDATE: &str = "validate";
}

/// Read-only access to a directory tree.
pub trait FileSystemRepository: Send + Sync {
    /// List the entries of a directory.
    ///
    /// Entries whose metadata cannot be read are skipped rather than
    /// failing the whole listing.
    fn list_directory(&self, path: &FilePath) -> RepositoryResult<DirectoryListing>;

    /// Read a whole file, rejecting it before reading if it exceeds the
    /// configured maximum size.
    fn read_file(&self, path: &FilePath) -> RepositoryResult<FileContent>;

    /// Whether the path exists. Invalid paths are an error, not `false`.
    fn exists(&self, path: &FilePath) -> RepositoryResult<bool>;

    /// Whether the path can actually be opened for reading.
    fn is_readable(&self, path: &FilePath) -> RepositoryResult<bool>;

    /// Whether the path is a directory.
    fn is_directory(&self, path: &FilePath) -> RepositoryResult<bool>;

    /// Metadata for a single path.
    fn file_info(&self, path: &FilePath) -> RepositoryResult<FileSystemEntry>;

    /// Confirm the path resolves inside the root.
    fn validate_path(&self, path: &FilePath) -> RepositoryResult<()>;

    /// Aggregate statistics over the files of one directory.
    fn directory_stats(&self, path: &FilePath) -> RepositoryResult<DirectoryStats> {
        let listing = self.list_directory(path)?;
        Ok(DirectoryStats::from_listing(&listing))
    }
}

/// Aggregates over one directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStats {
    pub total_files: usize,
    pub total_directories: usize,
    /// Sum of file sizes.
    pub total_size: FileSize,
    pub largest_file: Option<FileSystemEntry>,
    pub newest_file: Option<FileSystemEntry>,
    pub oldest_file: Option<FileSystemEntry>,
}

impl DirectoryStats {
    /// Reduce a listing. Extremes consider files only; on ties the entry
    /// enumerated first wins.
    pub fn from_listing(listing: &DirectoryListing) -> Self {
        let mut largest: Option<&FileSystemEntry> = None;
        let mut newest: Option<&FileSystemEntry> = None;
        let mut oldest: Option<&FileSystemEntry> = None;

        for entry in listing.entries().iter().filter(|e| !e.is_dir()) {
            if largest.map_or(true, |cur| entry.size() > cur.size()) {
                largest = Some(entry);
            }
            if newest.map_or(true, |cur| entry.mod_time() > cur.mod_time()) {
                newest = Some(entry);
            }
            if oldest.map_or(true, |cur| entry.mod_time() < cur.mod_time()) {
                oldest = Some(entry);
            }
        }

        Self {
            total_files: listing.file_count(),
            total_directories: listing.directory_count(),
            total_size: listing.total_size(),
            largest_file: largest.cloned(),
            newest_file: newest.cloned(),
            oldest_file: oldest.cloned(),
        }
    }
}

/// Path of a child entry relative to the root.
pub(crate) fn child_path(dir: &str, name: &str) -> String {
    if dir == "." {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

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

    #[test]
    fn test_stats_from_listing() {
        let listing = DirectoryListing::new(
            ".",
            vec![
                entry("sub", 9999, 9999, true),
                entry("a", 10, 100, false),
                entry("b", 30, 300, false),
                entry("c", 30, 50, false),
            ],
        )
        .unwrap();

        let stats = DirectoryStats::from_listing(&listing);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_directories, 1);
        assert_eq!(stats.total_size, FileSize::new(70));
        // Tie on size: first encountered wins.
        assert_eq!(stats.largest_file.unwrap().name(), "b");
        assert_eq!(stats.newest_file.unwrap().name(), "b");
        assert_eq!(stats.oldest_file.unwrap().name(), "c");
    }

    #[test]
    fn test_stats_empty() {
        let listing = DirectoryListing::new(".", Vec::new()).unwrap();
        let stats = DirectoryStats::from_listing(&listing);
        assert_eq!(stats.total_files, 0);
        assert!(stats.largest_file.is_none());
        assert!(stats.newest_file.is_none());
        assert!(stats.oldest_file.is_none());
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path(".", "a.txt"), "a.txt");
        assert_eq!(child_path("docs", "a.txt"), "docs/a.txt");
    }
}
