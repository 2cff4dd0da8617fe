//! HTTP Error Mapping
//!
//! Maps application errors to status codes and `{"error": "..."}` bodies.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use zipper_core::domain::DomainError;
use zipper_core::error::AppError;

use crate::types::ErrorBody;

/// Client-facing messages
pub mod message {
    pub const INVALID_JSON: &str = "invalid json";
    pub const EMPTY_URL: &str = "empty url";
    pub const NOT_FOUND: &str = "task not found";
    pub const LIMIT_REACHED: &str = "items limit reached";
    pub const TYPE_NOT_ALLOWED: &str = "only .pdf and .jpeg are allowed";
    pub const ALREADY_STARTED: &str = "task already started";
    pub const NO_ITEMS: &str = "no valid items to process";
    pub const BUSY: &str = "server is busy, try later";
    pub const RESULT_NOT_READY: &str = "result not ready";
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{}", message::INVALID_JSON)]
    InvalidJson,

    #[error("{}", message::EMPTY_URL)]
    EmptyUrl,

    #[error("{}", message::RESULT_NOT_READY)]
    ResultNotReady,

    #[error(transparent)]
    App(#[from] AppError),
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::App(AppError::NotFound(_)) => message::NOT_FOUND.to_string(),
            ApiError::App(AppError::Busy) => message::BUSY.to_string(),
            ApiError::App(AppError::Domain(e)) => domain_message(e),
            other => other.to_string(),
        }
    }
}

fn domain_message(err: &DomainError) -> String {
    match err {
        DomainError::TooManyItems { .. } => message::LIMIT_REACHED.to_string(),
        DomainError::UnsupportedType(_) => message::TYPE_NOT_ALLOWED.to_string(),
        DomainError::AlreadyStarted => message::ALREADY_STARTED.to_string(),
        DomainError::NoItems => message::NO_ITEMS.to_string(),
        other => other.to_string(),
    }
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::TooManyItems { .. }
        | DomainError::UnsupportedType(_)
        | DomainError::InvalidUrl(_)
        | DomainError::NoItems => StatusCode::BAD_REQUEST,
        DomainError::AlreadyStarted | DomainError::InvalidStateTransition { .. } => {
            StatusCode::CONFLICT
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson | ApiError::EmptyUrl => StatusCode::BAD_REQUEST,
            ApiError::ResultNotReady => StatusCode::NOT_FOUND,
            ApiError::App(AppError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::App(AppError::Busy) => StatusCode::CONFLICT,
            ApiError::App(AppError::Domain(e)) => domain_status(e),
            ApiError::App(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.message(),
        })
    }
}
