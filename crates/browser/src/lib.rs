//! # FileView Browser Library
//!
//! Root-confined, read-only access to a directory tree, plus the thin
//! service layer and configuration used by the `fileview` binary.
//!
//! ## Overview
//!
//! A raw path string flows through three stages:
//!
//! ```text
//! raw string ──► FilePath::new ──► FileSystemRepository ──► FileService views
//!                (string checks)   (canonical containment)  (hide/sort/preview)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use browser::{Config, FileService, LocalRepository};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let repo = LocalRepository::new(&config.storage.root, config.storage.max_file_size)?;
//!     let service = FileService::new(repo, config.browse.preview_chars);
//!
//!     let listing = service.list(".", &config.list_options())?;
//!     for entry in &listing.entries {
//!         println!("{} {}", entry.size_human, entry.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and defaults
//! - [`repository`]: Root-confined filesystem access
//! - [`service`]: Filtering, sorting and view projection
//! - [`error`]: Boundary error type

pub mod config;
pub mod error;
pub mod repository;
pub mod service;

// Re-export model for convenience
pub use model;

pub use config::Config;
pub use error::{RepositoryError, RepositoryResult};
pub use repository::{DirectoryStats, FileSystemRepository, LocalRepository, MemoryRepository};
pub use service::{
    ContentView, EntryView, FileService, ListOptions, ListingView, SortOrder, StatsView,
};
