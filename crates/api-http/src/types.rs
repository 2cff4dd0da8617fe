//! REST Request/Response Types

use serde::{Deserialize, Serialize};
use zipper_core::domain::JobSnapshot;

/// Mount point of the output directory
pub const FILES_ROUTE: &str = "/files";

/// POST /tasks/{id}/items
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    #[serde(default)]
    pub url: String,
}

/// POST /tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub added: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub status: String,
}

/// GET /tasks/{id}/status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusResponse {
    pub status: String,
    pub added: usize,
    pub done: usize,
    pub error: String,
    /// Empty until an archive exists
    pub result_url: String,
}

impl From<&JobSnapshot> for StatusResponse {
    fn from(job: &JobSnapshot) -> Self {
        let result_url = job
            .result_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|name| format!("{}/{}", FILES_ROUTE, name.to_string_lossy()))
            .unwrap_or_default();

        Self {
            status: job.state.as_str().to_string(),
            added: job.added,
            done: job.done,
            error: job.error_text.clone(),
            result_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
