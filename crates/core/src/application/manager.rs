// Job Manager - entry point for create / add item / run / status

use super::admission::AdmissionGate;
use super::constants::{
    DEFAULT_MAX_PARALLEL, DEFAULT_OUTPUT_DIR, DEFAULT_STAGING_DIR, RUNNER_PANICKED,
};
use super::job_store::{lock_job, JobStore, SharedJob};
use super::runner::JobRunner;
use crate::domain::{ItemCount, JobSnapshot};
use crate::error::{AppError, Result};
use crate::port::{Fetcher, IdProvider, Packager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

/// Job manager configuration
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Admission capacity (jobs running at the same time), at least 1
    pub max_parallel: usize,
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

pub struct JobManager {
    store: JobStore,
    gate: AdmissionGate,
    runner: Arc<JobRunner>,
    runtime: Handle,
}

impl JobManager {
    /// Build a manager bound to the current tokio runtime
    ///
    /// Creates the staging and output directories.
    pub fn new(
        config: ManagerConfig,
        id_provider: Arc<dyn IdProvider>,
        fetcher: Arc<dyn Fetcher>,
        packager: Arc<dyn Packager>,
    ) -> Result<Self> {
        if config.max_parallel == 0 {
            return Err(AppError::Config(
                "max_parallel must be at least 1".to_string(),
            ));
        }

        std::fs::create_dir_all(&config.staging_dir)?;
        std::fs::create_dir_all(&config.output_dir)?;

        let runtime = Handle::try_current()
            .map_err(|e| AppError::Config(format!("no tokio runtime: {}", e)))?;

        info!(
            max_parallel = config.max_parallel,
            staging_dir = %config.staging_dir.display(),
            output_dir = %config.output_dir.display(),
            "Job manager initialized"
        );

        Ok(Self {
            store: JobStore::new(id_provider),
            gate: AdmissionGate::new(config.max_parallel),
            runner: Arc::new(JobRunner::new(
                fetcher,
                packager,
                config.staging_dir,
                config.output_dir,
            )),
            runtime,
        })
    }

    /// Create an empty job
    pub fn create(&self) -> Result<JobSnapshot> {
        let job = self.store.create()?;
        let snapshot = lock_job(&job).snapshot();
        info!(job_id = %snapshot.id, jobs = self.store.len(), "Job created");
        Ok(snapshot)
    }

    /// Validate and append an item URL to a job that has not started
    pub fn add_item(&self, id: &str, raw_url: &str) -> Result<ItemCount> {
        let job = self.find(id)?;
        let count = lock_job(&job).add_item(raw_url)?;
        debug!(job_id = %id, url = %raw_url, added = count.added, "Item added");
        Ok(count)
    }

    /// Admit a job and start its pipeline in the background
    ///
    /// # Errors
    /// - AppError::NotFound for an unknown id
    /// - DomainError::AlreadyStarted / DomainError::NoItems
    /// - AppError::Busy when every admission slot is taken (the job stays startable)
    pub fn run(&self, id: &str) -> Result<()> {
        let job = self.find(id)?;
        lock_job(&job).claim()?;

        let permit = match self.gate.try_admit() {
            Some(permit) => permit,
            None => {
                lock_job(&job).release_claim();
                warn!(job_id = %id, capacity = self.gate.capacity(), "Admission refused, all slots busy");
                return Err(AppError::Busy);
            }
        };

        let runner = Arc::clone(&self.runner);
        let job_id = id.to_string();
        info!(job_id = %job_id, "Job admitted");

        self.runtime.spawn(async move {
            // Held until the pipeline is over, whatever way it ends
            let _permit = permit;

            // Separate task so a panicking pipeline cannot leave the job RUNNING
            let pipeline = tokio::spawn({
                let job = Arc::clone(&job);
                async move { runner.run(job).await }
            });

            if let Err(join_err) = pipeline.await {
                if join_err.is_panic() {
                    error!(job_id = %job_id, "Job runner panicked");
                    lock_job(&job).abort(RUNNER_PANICKED);
                } else {
                    warn!(job_id = %job_id, "Job runner cancelled");
                }
            }
            debug!(job_id = %job_id, "Admission slot released");
        });

        Ok(())
    }

    /// Point-in-time copy of a job
    pub fn snapshot(&self, id: &str) -> Result<JobSnapshot> {
        self.store
            .snapshot(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    pub fn output_dir(&self) -> &Path {
        self.runner.output_dir()
    }

    /// Jobs currently holding an admission slot
    pub fn running_jobs(&self) -> usize {
        self.gate.running()
    }

    fn find(&self, id: &str) -> Result<SharedJob> {
        self.store
            .get(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }
}
