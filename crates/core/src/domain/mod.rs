// Domain Layer - Pure business logic and entities

pub mod error;
pub mod item;
pub mod job;

// Re-exports
pub use error::DomainError;
pub use item::{has_allowed_extension, validate_item_url, ALLOWED_EXTENSIONS};
pub use job::{ItemCount, Job, JobId, JobSnapshot, JobState, MAX_ITEMS};
