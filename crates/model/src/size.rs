//! Non-negative byte counts.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Binary unit suffixes used by [`FileSize::human_readable`].
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// A size in bytes.
///
/// Ordering is the natural order of the byte count.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FileSize(u64);

impl FileSize {
    /// Zero bytes.
    pub const ZERO: FileSize = FileSize(0);

    /// Wrap a byte count.
    pub const fn new(bytes: u64) -> Self {
        Self(bytes)
    }

    /// The raw byte count.
    pub const fn bytes(&self) -> u64 {
        self.0
    }

    /// Format using 1024-based units.
    ///
    /// Values below 1024 are exact (`"1023 B"`). Larger values are divided
    /// by 1024 until below 1024 or the largest unit is reached, then shown
    /// with one decimal (`"1.5 KB"`).
    pub fn human_readable(&self) -> String {
        if self.0 < 1024 {
            return format!("{} B", self.0);
        }

        let mut value = self.0 as f64;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }

        format!("{:.1} {}", value, UNITS[unit])
    }

    /// Sum of two sizes; fails instead of wrapping.
    pub fn add(&self, other: FileSize) -> Result<FileSize> {
        self.0
            .checked_add(other.0)
            .map(FileSize)
            .ok_or(ModelError::Overflow {
                left: self.0,
                right: other.0,
            })
    }

    /// Difference of two sizes; fails if the result would be negative.
    pub fn subtract(&self, other: FileSize) -> Result<FileSize> {
        self.0
            .checked_sub(other.0)
            .map(FileSize)
            .ok_or(ModelError::Negative {
                left: self.0,
                right: other.0,
            })
    }

    pub fn is_greater_than(&self, other: FileSize) -> bool {
        self.0 > other.0
    }

    pub fn is_less_than(&self, other: FileSize) -> bool {
        self.0 < other.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check against a limit. A limit of zero means unlimited.
    pub fn validate(&self, max_size: u64) -> Result<()> {
        if max_size > 0 && self.0 > max_size {
            return Err(ModelError::ExceedsLimit {
                size: self.0,
                limit: max_size,
            });
        }
        Ok(())
    }
}

impl From<u64> for FileSize {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}

impl TryFrom<i64> for FileSize {
    type Error = ModelError;

    fn try_from(bytes: i64) -> Result<Self> {
        u64::try_from(bytes)
            .map(FileSize)
            .map_err(|_| ModelError::NegativeSize(bytes))
    }
}

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.human_readable())
    }
}
