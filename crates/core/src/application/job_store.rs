// Job Store - in-memory registry of jobs
//
// Two lock levels: the map lock only guards insert/lookup, each job carries
// its own mutex for its fields. Lookups never wait on a job's pipeline.

use crate::domain::{Job, JobId, JobSnapshot};
use crate::error::Result;
use crate::port::IdProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::debug;

/// A job behind its own lock
pub type SharedJob = Arc<Mutex<Job>>;

/// Lock a job, recovering the data if a previous holder panicked
pub fn lock_job(job: &SharedJob) -> MutexGuard<'_, Job> {
    job.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct JobStore {
    jobs: RwLock<HashMap<JobId, SharedJob>>,
    id_provider: Arc<dyn IdProvider>,
}

impl JobStore {
    pub fn new(id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            id_provider,
        }
    }

    /// Register a new QUEUED job under a fresh identifier
    pub fn create(&self) -> Result<SharedJob> {
        let id = self.id_provider.generate_id()?;
        let job = Arc::new(Mutex::new(Job::new(id.clone())));

        self.jobs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.clone(), Arc::clone(&job));

        debug!(job_id = %id, "Job registered");
        Ok(job)
    }

    /// Look up a job handle without copying its contents
    pub fn get(&self, id: &str) -> Option<SharedJob> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Consistent copy of a job, taken under the job's own lock
    pub fn snapshot(&self, id: &str) -> Option<JobSnapshot> {
        let job = self.get(id)?;
        let guard = lock_job(&job);
        Some(guard.snapshot())
    }

    pub fn len(&self) -> usize {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
