//! Validated, lexically cleaned relative paths.
//!
//! A [`FilePath`] is the only way a caller-supplied path string enters the
//! rest of the system. Construction rejects empty input, NUL bytes and any
//! `..` traversal pattern found in the raw input, *before* cleaning, since
//! cleaning can collapse an escape attempt into a harmless-looking form.
//!
//! Both the raw input and the cleaned form are kept. The cleaned form is the
//! canonical value; the raw form is retained so [`FilePath::is_secure`] can
//! re-inspect exactly what the caller sent.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};

use crate::error::{ModelError, Result};

/// A validated path relative to some root directory.
#[derive(Debug, Clone)]
pub struct FilePath {
    /// Input exactly as received.
    raw: String,
    /// Lexically cleaned form.
    cleaned: String,
}

impl FilePath {
    /// Validate and clean a raw path string.
    pub fn new(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(invalid(raw, "path cannot be empty"));
        }
        if raw.contains('\0') {
            return Err(invalid(raw, "path contains NUL byte"));
        }
        if contains_traversal(raw) {
            return Err(invalid(raw, "path traversal detected"));
        }

        let cleaned = clean(raw);
        if contains_traversal(&cleaned) {
            return Err(invalid(raw, "path escapes after normalization"));
        }

        Ok(Self {
            raw: raw.to_string(),
            cleaned,
        })
    }

    /// The cleaned path.
    pub fn as_str(&self) -> &str {
        &self.cleaned
    }

    /// The input as originally received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The cleaned path with any leading separators removed, suitable for
    /// joining onto a root directory. The root itself is `"."`.
    pub fn as_relative(&self) -> &str {
        let trimmed = self.cleaned.trim_start_matches('/');
        if trimmed.is_empty() {
            "."
        } else {
            trimmed
        }
    }

    /// Re-check both stored forms for NUL bytes and traversal patterns.
    pub fn is_secure(&self) -> bool {
        !self.raw.contains('\0')
            && !self.cleaned.contains('\0')
            && !contains_traversal(&self.raw)
            && !contains_traversal(&self.cleaned)
    }

    /// Join a relative segment onto this path.
    ///
    /// The segment is validated on its own before joining, so a traversal
    /// hidden in the suffix is rejected even though `self` is trusted.
    pub fn join(&self, relative: &str) -> Result<Self> {
        let segment = Self::new(relative)?;
        let combined = format!(
            "{}/{}",
            self.cleaned,
            segment.cleaned.trim_start_matches('/')
        );
        Self::new(&combined)
    }

    /// Last element of the path.
    pub fn base(&self) -> &str {
        if self.cleaned == "/" {
            return "/";
        }
        self.cleaned.rsplit('/').next().unwrap_or(&self.cleaned)
    }

    /// Everything but the last element, `"."` when there is no parent.
    pub fn dir(&self) -> &str {
        match self.cleaned.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.cleaned[..idx],
            None => ".",
        }
    }

    /// Extension of the last element including the dot, or `""`.
    pub fn ext(&self) -> &str {
        let base = self.base();
        match base.rfind('.') {
            Some(idx) => &base[idx..],
            None => "",
        }
    }

    /// Whether the path starts at the filesystem root.
    pub fn is_absolute(&self) -> bool {
        self.cleaned.starts_with('/')
    }

    /// Component-wise prefix containment check against `dir`.
    ///
    /// `"."` contains every relative path. A directory contains itself.
    pub fn is_within_directory(&self, dir: &FilePath) -> bool {
        if !self.is_secure() || !dir.is_secure() {
            return false;
        }
        if dir.cleaned == "." {
            return !self.is_absolute();
        }
        Path::new(&self.cleaned).starts_with(Path::new(&dir.cleaned))
    }
}

impl PartialEq for FilePath {
    fn eq(&self, other: &Self) -> bool {
        self.cleaned == other.cleaned
    }
}

impl Eq for FilePath {}

impl std::hash::Hash for FilePath {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.cleaned.hash(state);
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cleaned)
    }
}

impl AsRef<str> for FilePath {
    fn as_ref(&self) -> &str {
        &self.cleaned
    }
}

impl TryFrom<&str> for FilePath {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl std::str::FromStr for FilePath {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl Serialize for FilePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.cleaned)
    }
}

fn invalid(raw: &str, reason: &'static str) -> ModelError {
    ModelError::InvalidPath {
        path: raw.to_string(),
        reason,
    }
}

/// Detect `..` used as a path element with either separator.
fn contains_traversal(path: &str) -> bool {
    path == ".."
        || path.contains("../")
        || path.contains("..\\")
        || path.ends_with("/..")
        || path.ends_with("\\..")
}

/// Lexically clean a slash-separated path.
///
/// Collapses repeated separators, drops `.` elements, and resolves `..`
/// against preceding elements. `..` at the start of a rooted path is
/// dropped; at the start of a relative path it is kept. An empty result
/// becomes `"."`.
pub fn clean(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }

    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let body = parts.join("/");
    if rooted {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}
