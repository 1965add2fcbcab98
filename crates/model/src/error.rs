//! Error types for the model crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse, machine-checkable classification of a failure.
///
/// Callers branch on this rather than on message text. `InvalidPath`
/// (a rejected, possibly malicious request) is kept distinct from
/// `NotFound` (a legitimately absent file) so the two can be logged and
/// alerted on differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed path, traversal attempt, NUL byte or escape from the root.
    InvalidPath,
    /// The target does not exist.
    NotFound,
    /// The OS refused access.
    PermissionDenied,
    /// A file operation was attempted on a directory.
    IsDirectory,
    /// A directory operation was attempted on a non-directory.
    NotADirectory,
    /// Content exceeds the configured limit.
    TooLarge,
    /// Arithmetic exceeded the representable range.
    Overflow,
    /// Arithmetic produced a negative value.
    Negative,
    /// A required input was empty.
    EmptyInput,
    /// Any other I/O failure.
    Unknown,
}

impl ErrorCode {
    /// Stable string form, identical to the serialized representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPath => "INVALID_PATH",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::IsDirectory => "IS_DIRECTORY",
            ErrorCode::NotADirectory => "NOT_A_DIRECTORY",
            ErrorCode::TooLarge => "TOO_LARGE",
            ErrorCode::Overflow => "OVERFLOW",
            ErrorCode::Negative => "NEGATIVE",
            ErrorCode::EmptyInput => "EMPTY_INPUT",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while constructing or operating on model values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    // Path errors
    /// The path is empty, contains NUL, or attempts traversal.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending input as received.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    // Size errors
    /// A byte count was negative.
    #[error("size cannot be negative: {0}")]
    NegativeSize(i64),

    /// Addition exceeded the representable range.
    #[error("size overflow: {left} + {right} exceeds {max}", max = u64::MAX)]
    Overflow {
        /// Left operand.
        left: u64,
        /// Right operand.
        right: u64,
    },

    /// Subtraction would produce a negative size.
    #[error("size underflow: {left} - {right} is negative")]
    Negative {
        /// Left operand.
        left: u64,
        /// Right operand.
        right: u64,
    },

    /// A size exceeds a configured maximum.
    #[error("size {size} exceeds limit of {limit} bytes")]
    ExceedsLimit {
        /// Actual size.
        size: u64,
        /// Configured maximum.
        limit: u64,
    },

    // Entity errors
    /// An entry was created without a name.
    #[error("entry name cannot be empty")]
    EmptyName,

    /// File content was requested for a directory entry.
    #[error("cannot create file content for directory: {0}")]
    DirectoryEntry(String),

    /// Content length exceeds the allowed maximum.
    #[error("content too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge {
        /// Content length.
        size: u64,
        /// Maximum allowed.
        max: u64,
    },

    /// A listing was created without a path.
    #[error("directory listing path cannot be empty")]
    EmptyPath,
}

impl ModelError {
    /// Machine-checkable classification of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            ModelError::InvalidPath { .. } => ErrorCode::InvalidPath,
            ModelError::NegativeSize(_) | ModelError::Negative { .. } => ErrorCode::Negative,
            ModelError::Overflow { .. } => ErrorCode::Overflow,
            ModelError::ExceedsLimit { .. } | ModelError::TooLarge { .. } => ErrorCode::TooLarge,
            ModelError::EmptyName | ModelError::EmptyPath => ErrorCode::EmptyInput,
            ModelError::DirectoryEntry(_) => ErrorCode::IsDirectory,
        }
    }
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
