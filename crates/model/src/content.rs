//! File content snapshots.

use std::time::SystemTime;

use sha2::{Digest, Sha256};

use crate::entry::FileSystemEntry;
use crate::error::{ModelError, Result};
use crate::mime;
use crate::size::FileSize;

/// Encoding recorded when none is given.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Placeholder returned by [`FileContent::preview`] for binary data.
pub const BINARY_PREVIEW: &str = "[Binary content]";

/// 32-bit FNV-1a offset basis.
const FNV_OFFSET_BASIS: u32 = 2166136261;
/// 32-bit FNV-1a prime.
const FNV_PRIME: u32 = 16777619;

/// The full content of one file, read at a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    entry: FileSystemEntry,
    content: Vec<u8>,
    encoding: String,
    read_at: SystemTime,
}

impl FileContent {
    /// Wrap file bytes. Fails for directory entries.
    pub fn new(entry: FileSystemEntry, content: Vec<u8>, encoding: &str) -> Result<Self> {
        if entry.is_dir() {
            return Err(ModelError::DirectoryEntry(entry.name().to_string()));
        }

        let encoding = if encoding.is_empty() {
            DEFAULT_ENCODING
        } else {
            encoding
        };

        Ok(Self {
            entry,
            content,
            encoding: encoding.to_string(),
            read_at: SystemTime::now(),
        })
    }

    pub fn entry(&self) -> &FileSystemEntry {
        &self.entry
    }

    /// Borrow the raw bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Owned copy of the raw bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.content.clone()
    }

    /// Consume and return the raw bytes without copying.
    pub fn into_bytes(self) -> Vec<u8> {
        self.content
    }

    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    pub fn read_at(&self) -> SystemTime {
        self.read_at
    }

    /// Length of the content actually read.
    pub fn size(&self) -> FileSize {
        FileSize::new(self.content.len() as u64)
    }

    /// Empty content is text; any NUL byte means binary; otherwise the
    /// content is text iff it is valid UTF-8.
    pub fn is_text(&self) -> bool {
        if self.content.is_empty() {
            return true;
        }
        if self.content.contains(&0) {
            return false;
        }
        std::str::from_utf8(&self.content).is_ok()
    }

    pub fn is_binary(&self) -> bool {
        !self.is_text()
    }

    /// The content as a string slice, `None` for binary content.
    pub fn text(&self) -> Option<&str> {
        if !self.is_text() {
            return None;
        }
        std::str::from_utf8(&self.content).ok()
    }

    /// Resolve the MIME type.
    ///
    /// Extension lookup first, then text sniffing, then
    /// `application/octet-stream`.
    pub fn content_type(&self) -> &'static str {
        if let Some(mime) = extension_of(self.entry.name()).and_then(mime::from_extension) {
            return mime;
        }
        match self.text() {
            Some(text) => mime::sniff_text(text),
            None => mime::OCTET_STREAM,
        }
    }

    /// Lines with CRLF and lone CR normalized to LF. `None` for binary.
    pub fn lines(&self) -> Option<Vec<String>> {
        let text = self.text()?;
        let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
        Some(normalized.lines().map(str::to_string).collect())
    }

    /// Number of lines, 0 for binary content.
    pub fn line_count(&self) -> usize {
        self.lines().map(|lines| lines.len()).unwrap_or(0)
    }

    /// Truncated text for display.
    ///
    /// Binary content always yields `"[Binary content]"`. Text longer than
    /// `max_chars` characters is cut and suffixed with `"..."`.
    pub fn preview(&self, max_chars: usize) -> String {
        let Some(text) = self.text() else {
            return BINARY_PREVIEW.to_string();
        };

        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        }
    }

    /// 32-bit FNV-1a over the raw bytes. A change signal, not a digest.
    pub fn content_hash(&self) -> u32 {
        fnv1a_32(&self.content)
    }

    /// [`content_hash`](Self::content_hash) as eight lowercase hex digits.
    pub fn content_hash_hex(&self) -> String {
        format!("{:08x}", self.content_hash())
    }

    /// SHA-256 of the raw bytes as lowercase hex.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.content))
    }

    /// Check the content length against a limit. Zero means unlimited.
    pub fn validate_size(&self, max_size: u64) -> Result<()> {
        let size = self.content.len() as u64;
        if max_size > 0 && size > max_size {
            return Err(ModelError::TooLarge {
                size,
                max: max_size,
            });
        }
        Ok(())
    }
}

fn extension_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|idx| &name[idx..])
}

fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn file(name: &str, bytes: &[u8]) -> FileContent {
        let entry = FileSystemEntry::new(
            name,
            name,
            FileSize::new(bytes.len() as u64),
            SystemTime::now(),
            false,
            0o644,
        )
        .unwrap();
        FileContent::new(entry, bytes.to_vec(), "").unwrap()
    }

    #[test]
    fn test_directory_entry_rejected() {
        let dir = FileSystemEntry::new("docs", "docs", FileSize::ZERO, SystemTime::now(), true, 0o755)
            .unwrap();
        let err = FileContent::new(dir, Vec::new(), "utf-8").unwrap_err();
        assert_eq!(err.code(), ErrorCode::IsDirectory);
    }

    #[test]
    fn test_default_encoding() {
        assert_eq!(file("a.txt", b"x").encoding(), "utf-8");
    }

    #[test]
    fn test_empty_file() {
        let content = file("empty.txt", b"");
        assert!(content.is_text());
        assert_eq!(content.preview(10), "");
        assert_eq!(content.content_type(), "text/plain");
        assert_eq!(content.line_count(), 0);
    }

    #[test]
    fn test_nul_byte_is_binary() {
        let content = file("data.bin", b"abc\x00def");
        assert!(!content.is_text());
        assert!(content.is_binary());
        assert_eq!(content.content_type(), "application/octet-stream");
        assert_eq!(content.preview(3), "[Binary content]");
        assert_eq!(content.preview(1000), "[Binary content]");
        assert!(content.lines().is_none());
        assert_eq!(content.line_count(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_binary() {
        let content = file("blob", &[0xff, 0xfe, 0x41]);
        assert!(content.is_binary());
        assert_eq!(content.content_type(), "application/octet-stream");
    }

    #[test]
    fn test_sniff_json_without_known_extension() {
        let content = file("config", br#"{"a":1}"#);
        assert_eq!(content.content_type(), "application/json");
    }

    #[test]
    fn test_extension_lookup_wins() {
        assert_eq!(file("config.json", br#"{"a":1}"#).content_type(), "application/json");
        // Extension says text even though content looks like HTML.
        assert_eq!(file("page.txt", b"<p>hi</p>").content_type(), "text/plain");
        assert_eq!(file("page", b"<p>hi</p>").content_type(), "text/html");
    }

    #[test]
    fn test_lines_normalize_line_endings() {
        let content = file("mixed.txt", b"one\r\ntwo\rthree\nfour");
        assert_eq!(
            content.lines().unwrap(),
            vec!["one", "two", "three", "four"]
        );
        assert_eq!(content.line_count(), 4);

        let trailing = file("t.txt", b"a\nb\n");
        assert_eq!(trailing.line_count(), 2);
    }

    #[test]
    fn test_preview_truncation() {
        let content = file("a.txt", "héllo world".as_bytes());
        assert_eq!(content.preview(11), "héllo world");
        assert_eq!(content.preview(100), "héllo world");
        assert_eq!(content.preview(5), "héllo...");
        assert_eq!(content.preview(0), "...");
    }

    #[test]
    fn test_content_hash() {
        // Reference values for 32-bit FNV-1a.
        assert_eq!(file("e", b"").content_hash(), 0x811c9dc5);
        assert_eq!(file("a", b"a").content_hash(), 0xe40c292c);
        assert_eq!(file("f", b"foobar").content_hash(), 0xbf9cf968);
        assert_eq!(file("a", b"a").content_hash_hex(), "e40c292c");
    }

    #[test]
    fn test_sha256() {
        assert_eq!(
            file("e", b"").sha256_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_validate_size() {
        let content = file("a.txt", b"12345");
        assert!(content.validate_size(5).is_ok());
        assert!(content.validate_size(0).is_ok());
        let err = content.validate_size(4).unwrap_err();
        assert_eq!(err, ModelError::TooLarge { size: 5, max: 4 });
    }

    #[test]
    fn test_bytes_round_trip() {
        let content = file("a.txt", b"hello");
        assert_eq!(content.content(), b"hello");
        assert_eq!(content.to_bytes(), b"hello".to_vec());
        assert_eq!(content.size().bytes(), 5);
        assert_eq!(content.into_bytes(), b"hello".to_vec());
    }
}
