//! REST API Layer
//!
//! Serves job creation, item submission, run, status and archive download over
//! HTTP, plus read-only access to the output directory under `/files`.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use server::{configure, ApiServer, HttpServerConfig};
