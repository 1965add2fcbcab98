//! Directory entry snapshots.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::path::FilePath;
use crate::size::FileSize;

/// Owner read permission bit.
const OWNER_READ: u32 = 0o400;
/// Owner write permission bit.
const OWNER_WRITE: u32 = 0o200;
/// Owner execute permission bit.
const OWNER_EXEC: u32 = 0o100;

/// Type of filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link (not followed).
    Symlink,
    /// Other (device, socket, fifo).
    Other,
}

/// An immutable snapshot of one directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemEntry {
    name: String,
    path: String,
    size: FileSize,
    mod_time: SystemTime,
    kind: EntryKind,
    permissions: u32,
}

impl FileSystemEntry {
    /// Create an entry. `path` is relative to the repository root.
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        size: FileSize,
        mod_time: SystemTime,
        is_dir: bool,
        permissions: u32,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ModelError::EmptyName);
        }

        Ok(Self {
            name,
            path: path.into(),
            size,
            mod_time,
            kind: if is_dir {
                EntryKind::Directory
            } else {
                EntryKind::File
            },
            permissions,
        })
    }

    /// Override the entry kind recorded at construction.
    pub fn with_kind(mut self, kind: EntryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn size(&self) -> FileSize {
        self.size
    }

    pub fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    /// Modification time as Unix epoch seconds, 0 if before the epoch.
    pub fn modified_unix(&self) -> u64 {
        self.mod_time
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Unix permission mode bits.
    pub fn permissions(&self) -> u32 {
        self.permissions
    }

    /// Dotfiles are hidden.
    /// Dot-prefixed names, except the `"."` and `".."` directory markers.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.') && self.name != "." && self.name != ".."
    }

    pub fn is_readable(&self) -> bool {
        self.permissions & OWNER_READ != 0
    }

    pub fn is_writable(&self) -> bool {
        self.permissions & OWNER_WRITE != 0
    }

    pub fn is_executable(&self) -> bool {
        self.permissions & OWNER_EXEC != 0
    }

    /// Formatted size, `"-"` for directories.
    pub fn human_readable_size(&self) -> String {
        if self.is_dir() {
            "-".to_string()
        } else {
            self.size.human_readable()
        }
    }

    /// Re-validate the stored name and path.
    ///
    /// Entries can be built straight from OS data, so this does not assume
    /// the path went through [`FilePath`] validation.
    pub fn is_secure(&self) -> bool {
        if self.name.contains('/') || self.name.contains('\0') {
            return false;
        }
        FilePath::new(&self.path)
            .map(|path| path.is_secure())
            .unwrap_or(false)
    }
}
