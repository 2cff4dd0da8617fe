// Port Layer - Interfaces for external dependencies

pub mod fetcher;
pub mod id_provider; // For deterministic testing
pub mod packager;

// Re-exports
pub use fetcher::{FetchError, Fetcher};
pub use id_provider::{IdProvider, RandomIdProvider};
pub use packager::{PackError, Packager};
