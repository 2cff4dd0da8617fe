//! REST Handlers
//!
//! Thin adapters over `JobManager`; all rules live in the core.

use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use tracing::debug;
use zipper_core::application::JobManager;

use crate::error::ApiError;
use crate::types::{AddItemRequest, AddItemResponse, CreateTaskResponse, RunResponse, StatusResponse};

/// POST /tasks
pub async fn create_task(manager: web::Data<JobManager>) -> Result<HttpResponse, ApiError> {
    let job = manager.create()?;
    Ok(HttpResponse::Created().json(CreateTaskResponse { id: job.id }))
}

/// POST /tasks/{id}/items
///
/// The body is parsed by hand so malformed JSON maps to our own error body.
pub async fn add_item(
    manager: web::Data<JobManager>,
    id: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let req: AddItemRequest = serde_json::from_slice(&body).map_err(|_| ApiError::InvalidJson)?;

    let url = req.url.trim();
    if url.is_empty() {
        return Err(ApiError::EmptyUrl);
    }

    let count = manager.add_item(&id, url)?;
    Ok(HttpResponse::Ok().json(AddItemResponse {
        added: count.added,
        limit: count.limit,
    }))
}

/// POST /tasks/{id}/run
pub async fn run_task(
    manager: web::Data<JobManager>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    manager.run(&id)?;
    Ok(HttpResponse::Accepted().json(RunResponse {
        status: "accepted".to_string(),
    }))
}

/// GET /tasks/{id}/status
pub async fn task_status(
    manager: web::Data<JobManager>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let job = manager.snapshot(&id)?;
    Ok(HttpResponse::Ok().json(StatusResponse::from(&job)))
}

/// GET /tasks/{id}/result
pub async fn task_result(
    manager: web::Data<JobManager>,
    id: web::Path<String>,
) -> Result<NamedFile, ApiError> {
    let job = manager.snapshot(&id)?;
    let path = job.result_path.ok_or(ApiError::ResultNotReady)?;

    let file = NamedFile::open_async(&path).await.map_err(|e| {
        debug!(job_id = %job.id, error = %e, "Archive not readable");
        ApiError::ResultNotReady
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.zip", job.id));

    Ok(file.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    }))
}

/// GET /health
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
