//! Root-confined access to the local filesystem.
//!
//! Every call canonicalizes both the root and the requested path, then
//! checks that the canonical target is a descendant of the canonical root.
//! Symlinks are listed from their own metadata and never followed during
//! enumeration; reading through one succeeds only when its target stays
//! inside the root.

use std::fs::{self, File, Metadata};
use std::io::Read;
use std::os::unix::fs::MetadataExt;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use model::{
    DirectoryListing, EntryKind, ErrorCode, FileContent, FilePath, FileSize, FileSystemEntry,
    DEFAULT_ENCODING,
};
use tracing::{debug, warn};

use super::{child_path, ops, FileSystemRepository};
use crate::error::{RepositoryError, RepositoryResult};

/// Permission bits kept from `st_mode`.
const PERMISSION_MASK: u32 = 0o7777;

/// Upper bound on the buffer reserved before reading.
const INITIAL_READ_CAPACITY: u64 = 64 * 1024;

/// Repository over a directory on local disk.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    /// Configured root, as given. Canonicalized on every call.
    root: PathBuf,
    /// Maximum readable file size in bytes. Zero means unlimited.
    max_file_size: u64,
}

impl LocalRepository {
    /// Create a repository rooted at `root`.
    ///
    /// The root must exist and be a directory.
    pub fn new(root: impl Into<PathBuf>, max_file_size: u64) -> RepositoryResult<Self> {
        let root = root.into();
        let metadata =
            fs::metadata(&root).map_err(|e| RepositoryError::from_io(ops::STAT, ".", e))?;
        if !metadata.is_dir() {
            return Err(RepositoryError::new(
                ops::STAT,
                ".",
                ErrorCode::NotADirectory,
                "root is not a directory",
            ));
        }

        Ok(Self {
            root,
            max_file_size,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Resolve `path` to a canonical location inside the root.
    fn resolve(&self, op: &'static str, path: &FilePath) -> RepositoryResult<PathBuf> {
        let requested = path.as_str();

        if !path.is_secure() {
            warn!(op, path = requested, "rejected insecure path");
            return Err(RepositoryError::invalid_path(op, requested, "path traversal detected"));
        }

        let root = fs::canonicalize(&self.root).map_err(|e| {
            RepositoryError::new(op, requested, ErrorCode::Unknown, "root directory unavailable")
                .with_source(e)
        })?;

        let candidate = root.join(path.as_relative());
        if !is_contained(&root, &candidate) {
            warn!(op, path = requested, "rejected path outside root");
            return Err(RepositoryError::invalid_path(op, requested, "path escapes root directory"));
        }

        let canonical =
            fs::canonicalize(&candidate).map_err(|e| RepositoryError::from_io(op, requested, e))?;

        if !is_contained(&root, &canonical) {
            warn!(op, path = requested, "rejected path resolving outside root");
            return Err(RepositoryError::invalid_path(
                op,
                requested,
                "path resolves outside root directory",
            ));
        }

        Ok(canonical)
    }
}

impl FileSystemRepository for LocalRepository {
    fn list_directory(&self, path: &FilePath) -> RepositoryResult<DirectoryListing> {
        let op = ops::LIST;
        let dir = self.resolve(op, path)?;
        let requested = path.as_str();

        let metadata = fs::metadata(&dir).map_err(|e| RepositoryError::from_io(op, requested, e))?;
        if !metadata.is_dir() {
            return Err(RepositoryError::new(
                op,
                requested,
                ErrorCode::NotADirectory,
                "path is not a directory",
            ));
        }

        let read_dir = fs::read_dir(&dir).map_err(|e| RepositoryError::from_io(op, requested, e))?;
        let relative_dir = path.as_relative();
        let mut entries = Vec::new();

        for entry_result in read_dir {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    debug!(path = requested, error = %e, "skipping unreadable entry");
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();

            // DirEntry::metadata does not traverse symlinks
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    debug!(path = requested, name, error = %e, "skipping entry without metadata");
                    continue;
                }
            };

            match build_entry(&name, child_path(relative_dir, &name), &metadata) {
                Ok(entry) => entries.push(entry),
                Err(e) => debug!(path = requested, name, error = %e, "skipping invalid entry"),
            }
        }

        debug!(path = requested, count = entries.len(), "listed directory");
        DirectoryListing::new(relative_dir, entries)
            .map_err(|e| RepositoryError::from_model(op, requested, e))
    }

    fn read_file(&self, path: &FilePath) -> RepositoryResult<FileContent> {
        let op = ops::READ;
        let target = self.resolve(op, path)?;
        let requested = path.as_str();

        let metadata =
            fs::metadata(&target).map_err(|e| RepositoryError::from_io(op, requested, e))?;
        if metadata.is_dir() {
            return Err(RepositoryError::new(
                op,
                requested,
                ErrorCode::IsDirectory,
                "path is a directory",
            ));
        }
        // FIFOs block on open and devices never reach EOF
        if !metadata.is_file() {
            return Err(RepositoryError::new(
                op,
                requested,
                ErrorCode::Unknown,
                "not a regular file",
            ));
        }
        self.check_size(op, requested, metadata.len())?;

        let file = File::open(&target).map_err(|e| RepositoryError::from_io(op, requested, e))?;

        // Bound the read so a file that grew after the stat is still caught.
        let limit = if self.max_file_size > 0 {
            self.max_file_size + 1
        } else {
            u64::MAX
        };
        let capacity = metadata.len().min(limit).min(INITIAL_READ_CAPACITY);
        let mut content = Vec::with_capacity(capacity as usize);
        file.take(limit)
            .read_to_end(&mut content)
            .map_err(|e| RepositoryError::from_io(op, requested, e))?;
        self.check_size(op, requested, content.len() as u64)?;

        let entry = build_entry(entry_name(path), path.as_relative().to_string(), &metadata)
            .map_err(|e| RepositoryError::from_model(op, requested, e))?;

        debug!(path = requested, bytes = content.len(), "read file");
        FileContent::new(entry, content, DEFAULT_ENCODING)
            .map_err(|e| RepositoryError::from_model(op, requested, e))
    }

    fn exists(&self, path: &FilePath) -> RepositoryResult<bool> {
        match self.resolve(ops::EXISTS, path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_readable(&self, path: &FilePath) -> RepositoryResult<bool> {
        let target = match self.resolve(ops::STAT, path) {
            Ok(target) => target,
            Err(e) if matches!(e.code, ErrorCode::NotFound | ErrorCode::PermissionDenied) => {
                return Ok(false)
            }
            Err(e) => return Err(e),
        };

        let metadata = match fs::metadata(&target) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(false),
        };

        // Opening is the only reliable answer; mode bits miss ACLs.
        let readable = if metadata.is_dir() {
            fs::read_dir(&target).is_ok()
        } else if metadata.is_file() {
            File::open(&target).is_ok()
        } else {
            false
        };
        Ok(readable)
    }

    fn is_directory(&self, path: &FilePath) -> RepositoryResult<bool> {
        let target = self.resolve(ops::STAT, path)?;
        let metadata = fs::metadata(&target)
            .map_err(|e| RepositoryError::from_io(ops::STAT, path.as_str(), e))?;
        Ok(metadata.is_dir())
    }

    fn file_info(&self, path: &FilePath) -> RepositoryResult<FileSystemEntry> {
        let op = ops::STAT;
        let target = self.resolve(op, path)?;
        let requested = path.as_str();

        let metadata =
            fs::metadata(&target).map_err(|e| RepositoryError::from_io(op, requested, e))?;
        build_entry(entry_name(path), path.as_relative().to_string(), &metadata)
            .map_err(|e| RepositoryError::from_model(op, requested, e))
    }

    fn validate_path(&self, path: &FilePath) -> RepositoryResult<()> {
        self.resolve(ops::VALIDATE, path).map(|_| ())
    }
}

impl LocalRepository {
    fn check_size(&self, op: &'static str, requested: &str, size: u64) -> RepositoryResult<()> {
        FileSize::new(size).validate(self.max_file_size).map_err(|_| {
            RepositoryError::new(
                op,
                requested,
                ErrorCode::TooLarge,
                format!(
                    "file size {} exceeds limit of {} bytes",
                    size, self.max_file_size
                ),
            )
        })
    }
}

/// Whether `path` is `root` or below it.
///
/// The remainder after the root prefix must consist of plain names and
/// must pass [`FilePath::is_within_directory`] against the root itself.
fn is_contained(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return false;
    }

    let relative = relative.to_string_lossy();
    let relative = if relative.is_empty() { "." } else { relative.as_ref() };
    match (FilePath::new(relative), FilePath::new(".")) {
        (Ok(relative), Ok(root)) => relative.is_within_directory(&root),
        _ => false,
    }
}

/// Entry name for a requested path. The root is reported as `"."`.
fn entry_name(path: &FilePath) -> &str {
    if path.as_relative() == "." {
        "."
    } else {
        path.base()
    }
}

/// Snapshot OS metadata as an entry.
fn build_entry(
    name: &str,
    relative_path: String,
    metadata: &Metadata,
) -> model::Result<FileSystemEntry> {
    let file_type = metadata.file_type();
    let kind = if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    };

    let size = if file_type.is_dir() { 0 } else { metadata.len() };
    let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

    Ok(FileSystemEntry::new(
        name,
        relative_path,
        FileSize::new(size),
        modified,
        file_type.is_dir(),
        metadata.mode() & PERMISSION_MASK,
    )?
    .with_kind(kind))
}
