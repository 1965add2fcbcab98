//! In-memory repository for tests and embedding.
//!
//! Applies the same path and size rules as [`LocalRepository`](super::LocalRepository)
//! without touching disk. Entries are enumerated in insertion order.

use std::time::SystemTime;

use model::{
    DirectoryListing, ErrorCode, FileContent, FilePath, FileSize, FileSystemEntry, DEFAULT_ENCODING,
};

use super::{ops, FileSystemRepository};
use crate::error::{RepositoryError, RepositoryResult};

const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone)]
enum NodeData {
    File(Vec<u8>),
    Directory,
}

#[derive(Debug, Clone)]
struct Node {
    /// Path relative to the root, cleaned, never `"."`.
    path: String,
    data: NodeData,
    mod_time: SystemTime,
    mode: u32,
}

impl Node {
    fn parent(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => ".",
        }
    }

    fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    fn is_dir(&self) -> bool {
        matches!(self.data, NodeData::Directory)
    }

    fn to_entry(&self) -> model::Result<FileSystemEntry> {
        let size = match &self.data {
            NodeData::File(bytes) => bytes.len() as u64,
            NodeData::Directory => 0,
        };
        FileSystemEntry::new(
            self.name(),
            self.path.clone(),
            FileSize::new(size),
            self.mod_time,
            self.is_dir(),
            self.mode,
        )
    }
}

/// A directory tree held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    nodes: Vec<Node>,
    max_file_size: u64,
}

impl MemoryRepository {
    /// Create an empty tree. `max_file_size` of zero means unlimited.
    pub fn new(max_file_size: u64) -> Self {
        Self {
            nodes: Vec::new(),
            max_file_size,
        }
    }

    /// Add a file, creating missing parent directories.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid [`FilePath`].
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.with_file_at(path, content, SystemTime::now())
    }

    /// Add a file with an explicit modification time.
    pub fn with_file_at(
        mut self,
        path: &str,
        content: impl Into<Vec<u8>>,
        mod_time: SystemTime,
    ) -> Self {
        let key = fixture_key(path);
        self.ensure_parents(&key);
        self.insert(Node {
            path: key,
            data: NodeData::File(content.into()),
            mod_time,
            mode: DEFAULT_FILE_MODE,
        });
        self
    }

    /// Add a directory, creating missing parents.
    pub fn with_dir(mut self, path: &str) -> Self {
        let key = fixture_key(path);
        self.ensure_parents(&key);
        self.insert(Node {
            path: key,
            data: NodeData::Directory,
            mod_time: SystemTime::now(),
            mode: DEFAULT_DIR_MODE,
        });
        self
    }

    /// Override the permission bits of an existing node.
    pub fn with_mode(mut self, path: &str, mode: u32) -> Self {
        let key = fixture_key(path);
        if let Some(node) = self.nodes.iter_mut().find(|n| n.path == key) {
            node.mode = mode;
        }
        self
    }

    fn ensure_parents(&mut self, key: &str) {
        let mut prefix = String::new();
        let segments: Vec<&str> = key.split('/').collect();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if self.find(&prefix).is_none() {
                self.nodes.push(Node {
                    path: prefix.clone(),
                    data: NodeData::Directory,
                    mod_time: SystemTime::now(),
                    mode: DEFAULT_DIR_MODE,
                });
            }
        }
    }

    fn insert(&mut self, node: Node) {
        match self.nodes.iter_mut().find(|n| n.path == node.path) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    fn find(&self, key: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.path == key)
    }

    /// Look up a node. `None` means the root directory.
    fn lookup(&self, op: &'static str, path: &FilePath) -> RepositoryResult<Option<&Node>> {
        if !path.is_secure() {
            return Err(RepositoryError::invalid_path(op, path.as_str(), "path traversal detected"));
        }
        let key = path.as_relative();
        if key == "." {
            return Ok(None);
        }
        self.find(key).map(Some).ok_or_else(|| {
            RepositoryError::new(op, path.as_str(), ErrorCode::NotFound, "no such file or directory")
        })
    }
}

impl FileSystemRepository for MemoryRepository {
    fn list_directory(&self, path: &FilePath) -> RepositoryResult<DirectoryListing> {
        let op = ops::LIST;
        if let Some(node) = self.lookup(op, path)? {
            if !node.is_dir() {
                return Err(RepositoryError::new(
                    op,
                    path.as_str(),
                    ErrorCode::NotADirectory,
                    "path is not a directory",
                ));
            }
        }

        let dir = path.as_relative();
        let entries = self
            .nodes
            .iter()
            .filter(|n| n.parent() == dir)
            .filter_map(|n| n.to_entry().ok())
            .collect();

        DirectoryListing::new(dir, entries)
            .map_err(|e| RepositoryError::from_model(op, path.as_str(), e))
    }

    fn read_file(&self, path: &FilePath) -> RepositoryResult<FileContent> {
        let op = ops::READ;
        let (node, bytes) = match self.lookup(op, path)? {
            Some(node) => match &node.data {
                NodeData::File(bytes) => (node, bytes),
                NodeData::Directory => return Err(directory_error(op, path)),
            },
            None => return Err(directory_error(op, path)),
        };

        FileSize::new(bytes.len() as u64)
            .validate(self.max_file_size)
            .map_err(|e| RepositoryError::new(op, path.as_str(), ErrorCode::TooLarge, e.to_string()))?;

        let entry = node
            .to_entry()
            .map_err(|e| RepositoryError::from_model(op, path.as_str(), e))?;
        FileContent::new(entry, bytes.clone(), DEFAULT_ENCODING)
            .map_err(|e| RepositoryError::from_model(op, path.as_str(), e))
    }

    fn exists(&self, path: &FilePath) -> RepositoryResult<bool> {
        match self.lookup(ops::EXISTS, path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_readable(&self, path: &FilePath) -> RepositoryResult<bool> {
        match self.lookup(ops::STAT, path) {
            Ok(None) => Ok(true),
            Ok(Some(node)) => Ok(node.mode & 0o400 != 0),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn is_directory(&self, path: &FilePath) -> RepositoryResult<bool> {
        Ok(self
            .lookup(ops::STAT, path)?
            .map_or(true, |node| node.is_dir()))
    }

    fn file_info(&self, path: &FilePath) -> RepositoryResult<FileSystemEntry> {
        let op = ops::STAT;
        let entry = match self.lookup(op, path)? {
            Some(node) => node.to_entry(),
            None => FileSystemEntry::new(
                ".",
                ".",
                FileSize::ZERO,
                SystemTime::now(),
                true,
                DEFAULT_DIR_MODE,
            ),
        };
        entry.map_err(|e| RepositoryError::from_model(op, path.as_str(), e))
    }

    fn validate_path(&self, path: &FilePath) -> RepositoryResult<()> {
        self.lookup(ops::VALIDATE, path).map(|_| ())
    }
}

fn directory_error(op: &'static str, path: &FilePath) -> RepositoryError {
    RepositoryError::new(op, path.as_str(), ErrorCode::IsDirectory, "path is a directory")
}

fn fixture_key(path: &str) -> String {
    FilePath::new(path)
        .unwrap_or_else(|e| panic!("invalid fixture path {path:?}: {e}"))
        .as_relative()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> FilePath {
        FilePath::new(raw).unwrap()
    }

    fn sample() -> MemoryRepository {
        MemoryRepository::new(0)
            .with_file("b.txt", "bee")
            .with_file("a.txt", "a")
            .with_file("docs/guide.md", "# Guide")
            .with_dir("empty")
    }

    #[test]
    fn test_list_root_in_insertion_order() {
        let listing = sample().list_directory(&path(".")).unwrap();
        let names: Vec<&str> = listing.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt", "docs", "empty"]);
    }

    #[test]
    fn test_list_nested() {
        let listing = sample().list_directory(&path("docs")).unwrap();
        assert_eq!(listing.entries().len(), 1);
        assert_eq!(listing.entries()[0].path(), "docs/guide.md");
    }

    #[test]
    fn test_list_empty_directory() {
        let listing = sample().list_directory(&path("empty")).unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn test_read_file() {
        let content = sample().read_file(&path("docs/guide.md")).unwrap();
        assert_eq!(content.content(), b"# Guide");
        assert_eq!(content.content_type(), "text/markdown");
    }

    #[test]
    fn test_read_errors() {
        let repo = sample();
        assert_eq!(repo.read_file(&path("docs")).unwrap_err().code, ErrorCode::IsDirectory);
        assert_eq!(repo.read_file(&path(".")).unwrap_err().code, ErrorCode::IsDirectory);
        assert_eq!(repo.read_file(&path("nope")).unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            repo.list_directory(&path("a.txt")).unwrap_err().code,
            ErrorCode::NotADirectory
        );
    }

    #[test]
    fn test_max_size() {
        let repo = MemoryRepository::new(3).with_file("ok", "abc").with_file("big", "abcd");
        assert!(repo.read_file(&path("ok")).is_ok());
        assert_eq!(repo.read_file(&path("big")).unwrap_err().code, ErrorCode::TooLarge);
    }

    #[test]
    fn test_probes() {
        let repo = sample().with_mode("a.txt", 0o200);
        assert!(repo.exists(&path("a.txt")).unwrap());
        assert!(!repo.exists(&path("z.txt")).unwrap());
        assert!(repo.is_directory(&path("docs")).unwrap());
        assert!(repo.is_directory(&path(".")).unwrap());
        assert!(!repo.is_readable(&path("a.txt")).unwrap());
        assert!(repo.is_readable(&path("b.txt")).unwrap());
        assert!(repo.validate_path(&path("docs/guide.md")).is_ok());
        assert_eq!(repo.file_info(&path("b.txt")).unwrap().size(), FileSize::new(3));
    }
}
