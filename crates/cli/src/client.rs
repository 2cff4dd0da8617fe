//! REST client for the Zipper daemon

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tabled::Tabled;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Deserialize)]
struct CreatedTask {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Deserialize, Tabled)]
pub struct AddedItem {
    pub added: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, Tabled)]
pub struct TaskStatus {
    pub status: String,
    pub added: usize,
    pub done: usize,
    pub error: String,
    pub result_url: String,
}

impl TaskStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self.status.as_str(), "done" | "error")
    }
}

pub struct ZipperClient {
    base_url: String,
    http: reqwest::Client,
}

impl ZipperClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn create(&self) -> Result<String> {
        let task: CreatedTask = self.call(self.http.post(self.url("/tasks"))).await?;
        Ok(task.id)
    }

    pub async fn add(&self, id: &str, url: &str) -> Result<AddedItem> {
        let req = self
            .http
            .post(self.url(&format!("/tasks/{}/items", id)))
            .json(&json!({ "url": url }));
        self.call(req).await
    }

    pub async fn run(&self, id: &str) -> Result<()> {
        let _: serde_json::Value = self
            .call(self.http.post(self.url(&format!("/tasks/{}/run", id))))
            .await?;
        Ok(())
    }

    pub async fn status(&self, id: &str) -> Result<TaskStatus> {
        self.call(self.http.get(self.url(&format!("/tasks/{}/status", id))))
            .await
    }

    /// Poll until the task reaches `done` or `error`
    pub async fn wait(&self, id: &str, interval: Duration) -> Result<TaskStatus> {
        loop {
            let status = self.status(id).await?;
            if status.is_finished() {
                return Ok(status);
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Stream the archive to `dest`, returning the byte count
    pub async fn download(&self, id: &str, dest: &Path) -> Result<u64> {
        let req = self.http.get(self.url(&format!("/tasks/{}/result", id)));
        let mut resp = checked(send(req).await?).await?;

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        let mut written = 0u64;
        while let Some(chunk) = resp.chunk().await.context("Download interrupted")? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    async fn call<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        checked(send(req).await?)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }
}

async fn send(req: RequestBuilder) -> Result<Response> {
    req.send().await.context("Failed to connect to daemon")
}

/// Turn a non-2xx response into an error carrying the server's message
async fn checked(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    anyhow::bail!("Server error ({}): {}", status.as_u16(), message)
}
