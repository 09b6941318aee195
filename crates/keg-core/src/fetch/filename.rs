//! Derive a cache filename for a fetched archive from its URL.

/// Fallback when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "archive.tar.gz";

/// Derive a safe local filename for caching the archive at `url`.
///
/// Uses the last path segment (query string excluded); falls back to a
/// generic name when the path is empty, root, or a reserved name.
pub fn archive_filename(url: &str) -> String {
    let segment = url::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .next_back()
            .map(str::to_string)
    });

    match segment {
        Some(s) if s != "." && s != ".." => s,
        _ => DEFAULT_FILENAME.to_string(),
    }
}
