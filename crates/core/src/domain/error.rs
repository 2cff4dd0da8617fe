// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("too many items (limit {limit})")]
    TooManyItems { limit: usize },

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("bad url: {0}")]
    InvalidUrl(String),

    #[error("task already started")]
    AlreadyStarted,

    #[error("no items")]
    NoItems,

    #[error("Invalid job state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type Result<T> = std::result::Result<T, DomainError>;
