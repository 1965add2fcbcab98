//! Content-type resolution by extension and by content sniffing.

/// Generic binary type.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Look up a MIME type from a file extension, with or without the dot.
pub fn from_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.trim_start_matches('.').to_ascii_lowercase();
    let mime = match ext.as_str() {
        // Text
        "txt" | "text" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "md" | "markdown" => "text/markdown",
        "xml" => "text/xml",
        "js" | "mjs" => "text/javascript",

        // Structured data
        "json" => "application/json",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        "pdf" => "application/pdf",
        "wasm" => "application/wasm",

        // Archives
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",

        // Audio / video
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",

        // Fonts
        "woff" => "font/woff",
        "woff2" => "font/woff2",

        _ => return None,
    };
    Some(mime)
}

/// Guess a MIME type for text with no known extension.
///
/// Looks at the first non-whitespace character: `{` or `[` means JSON,
/// `<` followed somewhere later by `>` means HTML, anything else is plain
/// text.
pub fn sniff_text(text: &str) -> &'static str {
    let trimmed = text.trim_start();
    match trimmed.chars().next() {
        Some('{') | Some('[') => "application/json",
        Some('<') if trimmed[1..].contains('>') => "text/html",
        _ => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(from_extension(".json"), Some("application/json"));
        assert_eq!(from_extension("HTML"), Some("text/html"));
        assert_eq!(from_extension(".txt"), Some("text/plain"));
        assert_eq!(from_extension(".PNG"), Some("image/png"));
        assert_eq!(from_extension(".bin"), None);
        assert_eq!(from_extension(""), None);
    }

    #[test]
    fn test_sniff_text() {
        assert_eq!(sniff_text("{\"a\":1}"), "application/json");
        assert_eq!(sniff_text("  \n[1, 2]"), "application/json");
        assert_eq!(sniff_text("<html><body></body></html>"), "text/html");
        assert_eq!(sniff_text("<no closing"), "text/plain");
        assert_eq!(sniff_text("hello"), "text/plain");
        assert_eq!(sniff_text(""), "text/plain");
    }
}
