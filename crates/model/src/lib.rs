//! # FileView Model
//!
//! Value objects and snapshot entities for the FileView read-only file
//! browser. Nothing in this crate touches the filesystem.
//!
//! ## Modules
//!
//! - [`path`]: validated, cleaned relative paths ([`FilePath`])
//! - [`size`]: non-negative byte counts ([`FileSize`])
//! - [`entry`]: directory entry snapshots ([`FileSystemEntry`])
//! - [`content`]: file content snapshots ([`FileContent`])
//! - [`listing`]: directory listings ([`DirectoryListing`])
//! - [`mime`]: content-type lookup and sniffing
//! - [`error`]: error taxonomy ([`ModelError`], [`ErrorCode`])

pub mod content;
pub mod entry;
pub mod error;
pub mod listing;
pub mod mime;
pub mod path;
pub mod size;

pub use content::{FileContent, BINARY_PREVIEW, DEFAULT_ENCODING};
pub use entry::{EntryKind, FileSystemEntry};
pub use error::{ErrorCode, ModelError, Result};
pub use listing::DirectoryListing;
pub use path::FilePath;
pub use size::FileSize;
