// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("task not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Domain(#[from] crate::domain::DomainError),

    #[error("too many tasks running")]
    Busy,

    #[error("identifier generation failed: {0}")]
    IdGeneration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
