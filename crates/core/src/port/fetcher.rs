// Fetcher Port
// Retrieves one remote item into a local staging directory

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-item fetch errors
///
/// These never fail the whole job on their own; the runner records them as
/// `"<url>: <error>"` lines.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("bad url: {0}")]
    InvalidUrl(String),

    #[error("status {0}")]
    HttpStatus(u16),

    #[error("file too large (> {})", format_limit(.max_bytes))]
    TooLarge { max_bytes: u64 },

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

fn format_limit(max_bytes: &u64) -> String {
    const MB: u64 = 1024 * 1024;
    if *max_bytes >= MB && *max_bytes % MB == 0 {
        format!("{} MB", max_bytes / MB)
    } else {
        format!("{} bytes", max_bytes)
    }
}

/// Fetcher trait
///
/// Implementations:
/// - HttpFetcher (infra-system): reqwest GET with timeout and size ceiling
/// - MockFetcher: scripted responses for tests
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Download `url` into `staging_dir` and return the local file path
    ///
    /// # Errors
    /// - FetchError::HttpStatus for any non-200 response
    /// - FetchError::TooLarge when the body exceeds the configured ceiling
    /// - FetchError::Io when the staged file cannot be written
    async fn fetch(&self, url: &str, staging_dir: &Path) -> Result<PathBuf, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted response for one URL
    #[derive(Debug, Clone)]
    pub enum MockFetch {
        /// Write these bytes to the staging file
        Body(Vec<u8>),
        /// Fail with an HTTP status
        Status(u16),
        /// Sleep, then behave like `Body`
        Slow { delay: Duration, body: Vec<u8> },
        /// Panic with message (for panic isolation testing)
        Panic(String),
    }

    /// Mock Fetcher for testing
    ///
    /// Unknown URLs answer with status 404.
    #[derive(Default)]
    pub struct MockFetcher {
        responses: Mutex<HashMap<String, MockFetch>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(self, url: impl Into<String>, response: MockFetch) -> Self {
            self.respond(url, response);
            self
        }

        pub fn respond(&self, url: impl Into<String>, response: MockFetch) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.into(), response);
        }

        /// URLs fetched so far, in call order
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    fn staged_name(url: &str) -> String {
        let without_query = url.split('?').next().unwrap_or(url);
        match without_query.rsplit('/').next() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => "file".to_string(),
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, url: &str, staging_dir: &Path) -> Result<PathBuf, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());

            let response = self
                .responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or(MockFetch::Status(404));

            let body = match response {
                MockFetch::Body(body) => body,
                MockFetch::Status(code) => return Err(FetchError::HttpStatus(code)),
                MockFetch::Slow { delay, body } => {
                    tokio::time::sleep(delay).await;
                    body
                }
                MockFetch::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for panic isolation testing
                }
            };

            let path = staging_dir.join(staged_name(url));
            tokio::fs::write(&path, body).await?;
            Ok(path)
        }
    }
}
