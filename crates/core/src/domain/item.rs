// Item validation: an item is a remote file URL attached to a job

use super::error::{DomainError, Result};
use url::Url;

/// File extensions accepted for items (compared case-insensitively)
pub const ALLOWED_EXTENSIONS: [&str; 2] = [".pdf", ".jpeg"];

/// Returns true when `path` ends in one of [`ALLOWED_EXTENSIONS`].
pub fn has_allowed_extension(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Validate a raw item URL before it is attached to a job.
///
/// The URL must be an absolute `http`/`https` URL whose path ends in an allowed
/// extension. No network access happens here.
pub fn validate_item_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| DomainError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(DomainError::InvalidUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }

    if !has_allowed_extension(url.path()) {
        return Err(DomainError::UnsupportedType(url.path().to_string()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_pdf_and_jpeg() {
        assert!(validate_item_url("https://x/a.pdf").is_ok());
        assert!(validate_item_url("https://x/b.jpeg").is_ok());
        assert!(validate_item_url("http://example.com/docs/REPORT.PDF").is_ok());
    }

    #[test]
    fn test_query_string_does_not_hide_extension() {
        assert!(validate_item_url("https://x/a.pdf?version=2").is_ok());
    }

    #[test]
    fn test_rejects_other_extensions() {
        let err = validate_item_url("https://x/c.gif").unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedType(_)));

        // .jpg is not .jpeg
        let err = validate_item_url("https://x/photo.jpg").unwrap_err();
        assert!(matches!(err, DomainError::UnsupportedType(_)));
    }

    #[test]
    fn test_rejects_malformed_url() {
        let err = validate_item_url("not a url.pdf").unwrap_err();
        assert!(matches!(err, DomainError::InvalidUrl(_)));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = validate_item_url("ftp://x/a.pdf").unwrap_err();
        assert!(matches!(err, DomainError::InvalidUrl(_)));
        assert!(err.to_string().contains("ftp"));
    }
}
