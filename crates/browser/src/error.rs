//! Errors raised at the filesystem boundary.

use std::io;

use model::{ErrorCode, ModelError};
use thiserror::Error;

/// A failed repository or service operation.
///
/// `path` is always the path as the caller requested it, relative to the
/// root. Resolved absolute paths are never stored here, so printing or
/// returning this error cannot disclose the layout outside the root.
#[derive(Debug, Error)]
#[error("{op} {path}: {reason}")]
pub struct RepositoryError {
    /// Operation that failed (`list`, `read`, ...).
    pub op: &'static str,
    /// Requested path.
    pub path: String,
    /// Machine-checkable classification.
    pub code: ErrorCode,
    /// Human-readable cause.
    pub reason: String,
    /// Underlying I/O error, if any.
    #[source]
    pub source: Option<io::Error>,
}

impl RepositoryError {
    /// Create an error without an I/O source.
    pub fn new(
        op: &'static str,
        path: impl Into<String>,
        code: ErrorCode,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            op,
            path: path.into(),
            code,
            reason: reason.into(),
            source: None,
        }
    }

    /// Classify an I/O error.
    pub fn from_io(op: &'static str, path: impl Into<String>, err: io::Error) -> Self {
        let code = match err.kind() {
            io::ErrorKind::NotFound => ErrorCode::NotFound,
            io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::Unknown,
        };
        Self {
            op,
            path: path.into(),
            code,
            reason: err.to_string(),
            source: Some(err),
        }
    }

    /// Wrap a model construction failure.
    pub fn from_model(op: &'static str, path: impl Into<String>, err: ModelError) -> Self {
        Self::new(op, path, err.code(), err.to_string())
    }

    /// Shorthand for an [`ErrorCode::InvalidPath`] error.
    pub fn invalid_path(op: &'static str, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(op, path, ErrorCode::InvalidPath, reason)
    }

    /// Attach the underlying I/O error.
    pub(crate) fn with_source(mut self, source: io::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Whether the request was rejected as unsafe rather than failing.
    pub fn is_invalid_path(&self) -> bool {
        self.code == ErrorCode::InvalidPath
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }
}

/// Result type alias for repository operations.
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classification() {
        let err = RepositoryError::from_io(
            "read",
            "a.txt",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code, ErrorCode::NotFound);
        assert!(err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());

        let err = RepositoryError::from_io(
            "read",
            "a.txt",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let err = RepositoryError::from_io("read", "a.txt", io::Error::other("disk on fire"));
        assert_eq!(err.code, ErrorCode::Unknown);
    }

    #[test]
    fn test_from_model() {
        let model_err = model::FilePath::new("../x").unwrap_err();
        let err = RepositoryError::from_model("list", "../x", model_err);
        assert!(err.is_invalid_path());
        assert!(err.to_string().starts_with("list ../x: invalid path"));
    }

    #[test]
    fn test_display() {
        let err = RepositoryError::new("read", "big.bin", ErrorCode::TooLarge, "too big");
        assert_eq!(err.to_string(), "read big.bin: too big");
    }
}
