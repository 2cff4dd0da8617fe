// Application Layer - Use Cases and Job Orchestration

pub mod admission;
pub mod constants;
pub mod job_store;
pub mod manager;
pub mod runner;

// Re-exports
pub use admission::{AdmissionGate, AdmissionPermit};
pub use job_store::{JobStore, SharedJob};
pub use manager::{JobManager, ManagerConfig};
pub use runner::JobRunner;
