//! Local file naming for downloaded items.

use url::Url;
use zipper_core::domain::ALLOWED_EXTENSIONS;

/// Name used when nothing usable is left of the URL basename
pub const FALLBACK_NAME: &str = "file";

/// Strips path traversal and query leftovers from a candidate filename.
///
/// - Trims surrounding whitespace
/// - Replaces `/`, `\` and `..` with `_`
/// - Drops everything from the first `?`
///
/// Returns an empty string when the result is empty or made only of dots.
pub fn sanitize(name: &str) -> String {
    let mut out = name
        .trim()
        .replace('/', "_")
        .replace('\\', "_")
        .replace("..", "_");

    if let Some(idx) = out.find('?') {
        out.truncate(idx);
    }

    if out.chars().all(|c| c == '.') {
        return String::new();
    }
    out
}

/// Staging filename for an item URL.
///
/// The URL path basename, sanitized, with the allowed extension re-appended
/// when sanitizing lost it.
pub fn local_file_name(url: &Url) -> String {
    let path = url.path();
    let basename = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");

    let mut name = sanitize(basename);
    if name.is_empty() {
        name = FALLBACK_NAME.to_string();
    }

    let path_lower = path.to_ascii_lowercase();
    for ext in ALLOWED_EXTENSIONS {
        if path_lower.ends_with(ext) && !name.to_ascii_lowercase().ends_with(ext) {
            name.push_str(ext);
        }
    }
    name
}
