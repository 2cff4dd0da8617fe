// HTTP fetcher implementation
// reason: reqwest streaming body so the size ceiling is enforced while reading
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use zipper_core::port::fetcher::{FetchError, Fetcher};

use crate::filename::local_file_name;

/// Default per-request timeout (15s)
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Default per-item size ceiling (25 MB)
pub const DEFAULT_MAX_BYTES: u64 = 25 * 1024 * 1024;

/// Prefix of in-progress downloads inside the staging directory
const PART_PREFIX: &str = ".part-";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl HttpFetcher {
    /// Create a fetcher with one pooled client for all jobs
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        info!(
            timeout_ms = settings.request_timeout.as_millis() as u64,
            max_bytes = settings.max_bytes,
            "HTTP fetcher ready"
        );

        Ok(Self { client, settings })
    }

    fn too_large(&self) -> FetchError {
        FetchError::TooLarge {
            max_bytes: self.settings.max_bytes,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, staging_dir: &Path) -> Result<PathBuf, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;

        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        if let Some(declared) = response.content_length() {
            if declared > self.settings.max_bytes {
                return Err(self.too_large());
            }
        }

        // Body lands in a private part file; the staged name is only taken
        // once the whole body is in under the ceiling
        let (part, part_path) = tempfile::Builder::new()
            .prefix(PART_PREFIX)
            .tempfile_in(staging_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(part);

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            written += chunk.len() as u64;
            if written > self.settings.max_bytes {
                return Err(self.too_large());
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        let path = staging_dir.join(local_file_name(&parsed));
        part_path.persist(&path).map_err(|e| e.error)?;

        debug!(url = %url, bytes = written, path = %path.display(), "Item downloaded");
        Ok(path)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout(err.to_string());
    }
    FetchError::Network(err.to_string())
}
