//! Presentation rules on top of a [`FileSystemRepository`].
//!
//! The service turns raw request strings into [`FilePath`]s, applies hidden
//! file filtering, name patterns and sort order, and projects results into
//! serializable views. InvalidPath rejections are logged at `warn` so they
//! can be alerted on; ordinary failures such as NotFound log at `debug`.

use std::time::SystemTime;

use model::{DirectoryListing, EntryKind, FileContent, FilePath, FileSize, FileSystemEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{RepositoryError, RepositoryResult};
use crate::repository::{ops, DirectoryStats, FileSystemRepository};

/// Default number of characters in a content preview.
pub const DEFAULT_PREVIEW_CHARS: usize = 500;

/// Order applied to listings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Name, ascending.
    #[default]
    Name,
    /// Size, ascending.
    Size,
    /// Modification time, newest first.
    Time,
}

/// Options for [`FileService::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Include dotfiles.
    pub show_hidden: bool,
    pub sort: SortOrder,
    /// Exact entry name to keep; `None` or `"*"` keeps everything.
    pub pattern: Option<String>,
}

/// One entry as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
    pub size: u64,
    pub size_human: String,
    /// Unix epoch seconds.
    pub modified: u64,
    /// Octal permission bits, e.g. `"0644"`.
    pub permissions: String,
    pub hidden: bool,
}

impl From<&FileSystemEntry> for EntryView {
    fn from(entry: &FileSystemEntry) -> Self {
        Self {
            name: entry.name().to_string(),
            path: entry.path().to_string(),
            kind: entry.kind(),
            size: entry.size().bytes(),
            size_human: entry.human_readable_size(),
            modified: entry.modified_unix(),
            permissions: format!("{:04o}", entry.permissions()),
            hidden: entry.is_hidden(),
        }
    }
}

/// A filtered, sorted directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingView {
    pub path: String,
    pub entries: Vec<EntryView>,
    /// Entries in the directory before filtering.
    pub total_count: usize,
    pub file_count: usize,
    pub directory_count: usize,
    /// Sum of the sizes of the shown files.
    pub total_size: u64,
    pub total_size_human: String,
    /// Unix epoch seconds.
    pub scanned_at: u64,
}

/// A file's content and derived facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentView {
    pub path: String,
    pub name: String,
    pub size: u64,
    pub size_human: String,
    pub content_type: String,
    pub encoding: String,
    pub is_text: bool,
    pub line_count: usize,
    /// FNV-1a change signal, 8 hex digits.
    pub hash: String,
    pub sha256: String,
    pub preview: String,
    pub modified: u64,
    pub read_at: u64,
}

/// Aggregates for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub path: String,
    pub total_files: usize,
    pub total_directories: usize,
    pub total_size: u64,
    pub total_size_human: String,
    pub largest_file: Option<EntryView>,
    pub newest_file: Option<EntryView>,
    pub oldest_file: Option<EntryView>,
}

impl StatsView {
    fn new(path: &FilePath, stats: &DirectoryStats) -> Self {
        Self {
            path: path.as_relative().to_string(),
            total_files: stats.total_files,
            total_directories: stats.total_directories,
            total_size: stats.total_size.bytes(),
            total_size_human: stats.total_size.human_readable(),
            largest_file: stats.largest_file.as_ref().map(EntryView::from),
            newest_file: stats.newest_file.as_ref().map(EntryView::from),
            oldest_file: stats.oldest_file.as_ref().map(EntryView::from),
        }
    }
}

/// Read-only browsing service.
pub struct FileService<R> {
    repository: R,
    preview_chars: usize,
}

impl<R: FileSystemRepository> FileService<R> {
    /// Create a service with the given default preview length.
    pub fn new(repository: R, preview_chars: usize) -> Self {
        Self {
            repository,
            preview_chars,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// List a directory with hidden filtering, pattern and sort applied.
    pub fn list(&self, raw_path: &str, options: &ListOptions) -> RepositoryResult<ListingView> {
        let path = parse_path(ops::LIST, raw_path)?;
        let listing = self
            .repository
            .list_directory(&path)
            .inspect_err(log_failure)?;

        let sorted = match options.sort {
            SortOrder::Name => listing.sort_by_name(),
            SortOrder::Size => listing.sort_by_size(),
            SortOrder::Time => listing.sort_by_mod_time(),
        };
        let pattern = options.pattern.as_deref().unwrap_or(model::listing::MATCH_ALL);

        // Re-wrap so filtering reuses the listing's own rules in sorted order.
        let mut view = DirectoryListing::new(listing.path(), sorted)
            .map_err(|e| RepositoryError::from_model(ops::LIST, raw_path, e))?;
        if !options.show_hidden {
            view = DirectoryListing::new(listing.path(), view.filter_hidden())
                .map_err(|e| RepositoryError::from_model(ops::LIST, raw_path, e))?;
        }
        let shown = DirectoryListing::new(listing.path(), view.filter_by_pattern(pattern))
            .map_err(|e| RepositoryError::from_model(ops::LIST, raw_path, e))?;

        debug!(
            path = listing.path(),
            total = listing.total_count(),
            shown = shown.total_count(),
            "listing served"
        );

        Ok(ListingView {
            path: listing.path().to_string(),
            entries: shown.entries().iter().map(EntryView::from).collect(),
            total_count: listing.total_count(),
            file_count: shown.file_count(),
            directory_count: shown.directory_count(),
            total_size: shown.total_size().bytes(),
            total_size_human: shown.total_size().human_readable(),
            scanned_at: unix_seconds(listing.scanned_at()),
        })
    }

    /// Read a file and describe it. `preview_chars` overrides the default.
    pub fn read(&self, raw_path: &str, preview_chars: Option<usize>) -> RepositoryResult<ContentView> {
        let content = self.read_content(raw_path)?;
        let entry = content.entry();
        let size: FileSize = content.size();

        Ok(ContentView {
            path: entry.path().to_string(),
            name: entry.name().to_string(),
            size: size.bytes(),
            size_human: size.human_readable(),
            content_type: content.content_type().to_string(),
            encoding: content.encoding().to_string(),
            is_text: content.is_text(),
            line_count: content.line_count(),
            hash: content.content_hash_hex(),
            sha256: content.sha256_hex(),
            preview: content.preview(preview_chars.unwrap_or(self.preview_chars)),
            modified: entry.modified_unix(),
            read_at: unix_seconds(content.read_at()),
        })
    }

    /// Read a file and return the raw snapshot.
    pub fn read_content(&self, raw_path: &str) -> RepositoryResult<FileContent> {
        let path = parse_path(ops::READ, raw_path)?;
        self.repository.read_file(&path).inspect_err(log_failure)
    }

    /// Metadata for one path.
    pub fn info(&self, raw_path: &str) -> RepositoryResult<EntryView> {
        let path = parse_path(ops::STAT, raw_path)?;
        let entry = self.repository.file_info(&path).inspect_err(log_failure)?;
        Ok(EntryView::from(&entry))
    }

    /// Aggregates for one directory.
    pub fn stats(&self, raw_path: &str) -> RepositoryResult<StatsView> {
        let path = parse_path(ops::LIST, raw_path)?;
        let stats = self
            .repository
            .directory_stats(&path)
            .inspect_err(log_failure)?;
        Ok(StatsView::new(&path, &stats))
    }
}

fn parse_path(op: &'static str, raw: &str) -> RepositoryResult<FilePath> {
    FilePath::new(raw).map_err(|e| {
        let err = RepositoryError::from_model(op, raw, e);
        log_failure(&err);
        err
    })
}

fn log_failure(err: &RepositoryError) {
    if err.is_invalid_path() {
        warn!(op = err.op, path = %err.path, code = %err.code, "rejected path: {}", err.reason);
    } else {
        debug!(op = err.op, path = %err.path, code = %err.code, "request failed: {}", err.reason);
    }
}

fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use model::ErrorCode;
    use std::time::Duration;

    fn at(secs: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn service() -> FileService<MemoryRepository> {
        let repo = MemoryRepository::new(4096)
            .with_file_at("b.txt", "bbbb", at(100))
            .with_file_at("a.txt", "a", at(300))
            .with_file_at(".hidden", "hh", at(200))
            .with_file("config", r#"{"a":1}"#)
            .with_file("data.bin", vec![0u8, 1, 2])
            .with_file("empty.txt", "")
            .with_file("big.log", vec![b'x'; 2048])
            .with_dir("docs");
        FileService::new(repo, 10)
    }

    fn names(view: &ListingView) -> Vec<&str> {
        view.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_list_hides_dotfiles_by_default() {
        let view = service().list(".", &ListOptions::default()).unwrap();
        assert!(!names(&view).contains(&".hidden"));
        assert_eq!(view.total_count, 8);
        assert_eq!(view.entries.len(), 7);
        assert_eq!(view.directory_count, 1);
    }

    #[test]
    fn test_list_sort_then_hide() {
        let view = service().list(".", &ListOptions::default()).unwrap();
        assert_eq!(
            names(&view),
            vec!["a.txt", "b.txt", "big.log", "config", "data.bin", "docs", "empty.txt"]
        );

        let options = ListOptions {
            show_hidden: true,
            ..ListOptions::default()
        };
        let view = service().list(".", &options).unwrap();
        assert_eq!(names(&view)[..3], [".hidden", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_list_sort_by_time() {
        let options = ListOptions {
            show_hidden: true,
            sort: SortOrder::Time,
            pattern: None,
        };
        let view = service().list(".", &options).unwrap();
        let timed: Vec<&str> = names(&view)
            .into_iter()
            .filter(|n| ["a.txt", "b.txt", ".hidden"].contains(n))
            .collect();
        assert_eq!(timed, vec!["a.txt", ".hidden", "b.txt"]);
    }

    #[test]
    fn test_list_pattern() {
        let options = ListOptions {
            pattern: Some("a.txt".to_string()),
            ..ListOptions::default()
        };
        let view = service().list(".", &options).unwrap();
        assert_eq!(names(&view), vec!["a.txt"]);
        assert_eq!(view.total_size, 1);
    }

    #[test]
    fn test_list_traversal_rejected() {
        let err = service().list("../", &ListOptions::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPath);
    }

    #[test]
    fn test_read_traversal_never_reaches_repository() {
        let err = service().read("../../etc/passwd", None).unwrap_err();
        assert!(err.is_invalid_path());
        assert_eq!(err.op, "read");
    }

    #[test]
    fn test_read_empty_file() {
        let view = service().read("empty.txt", None).unwrap();
        assert!(view.is_text);
        assert_eq!(view.preview, "");
        assert_eq!(view.content_type, "text/plain");
        assert_eq!(view.line_count, 0);
    }

    #[test]
    fn test_read_binary_file() {
        let view = service().read("data.bin", Some(2)).unwrap();
        assert!(!view.is_text);
        assert_eq!(view.content_type, "application/octet-stream");
        assert_eq!(view.preview, "[Binary content]");
    }

    #[test]
    fn test_read_sniffs_json() {
        let view = service().read("config", None).unwrap();
        assert_eq!(view.content_type, "application/json");
        assert_eq!(view.size_human, "7 B");
    }

    #[test]
    fn test_read_preview_default_and_override() {
        let view = service().read("big.log", None).unwrap();
        assert_eq!(view.preview, "xxxxxxxxxx...");
        assert_eq!(view.size_human, "2.0 KB");

        let view = service().read("big.log", Some(3)).unwrap();
        assert_eq!(view.preview, "xxx...");
    }

    #[test]
    fn test_read_too_large() {
        let repo = MemoryRepository::new(4).with_file("five", "12345");
        let err = FileService::new(repo, 10).read("five", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::TooLarge);
    }

    #[test]
    fn test_info() {
        let view = service().info("docs").unwrap();
        assert_eq!(view.kind, EntryKind::Directory);
        assert_eq!(view.size_human, "-");
        assert_eq!(view.permissions, "0755");
    }

    #[test]
    fn test_info_root_is_not_hidden() {
        for raw in [".", "/"] {
            let view = service().info(raw).unwrap();
            assert_eq!(view.name, ".");
            assert!(!view.hidden, "{raw}");
        }
    }

    #[test]
    fn test_stats() {
        let view = service().stats(".").unwrap();
        assert_eq!(view.total_directories, 1);
        assert_eq!(view.total_files, 7);
        assert_eq!(view.largest_file.unwrap().name, "big.log");
        assert_eq!(view.oldest_file.unwrap().name, "b.txt");
    }

    #[test]
    fn test_view_serialization() {
        let view = service().info("a.txt").unwrap();
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["modified"], 300);
    }
}
