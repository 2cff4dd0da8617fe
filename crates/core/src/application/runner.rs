// Job Runner - one job's download -> package pipeline
//
// Items are fetched strictly in insertion order. A failing item is recorded
// and the loop moves on; only "nothing fetched" or a packaging failure ends
// the job in ERROR. The job lock is only taken for short state updates,
// never across network or disk I/O.

use super::constants::{
    ALL_DOWNLOADS_FAILED, ARCHIVE_EXTENSION, STAGING_ERROR_PREFIX, ZIP_ERROR_PREFIX,
};
use super::job_store::{lock_job, SharedJob};
use crate::port::{Fetcher, Packager};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// How a started job ended
#[derive(Debug)]
enum Outcome {
    Packed {
        archive: PathBuf,
        item_errors: Vec<String>,
    },
    Failed(String),
}

pub struct JobRunner {
    fetcher: Arc<dyn Fetcher>,
    packager: Arc<dyn Packager>,
    staging_root: PathBuf,
    output_dir: PathBuf,
}

impl JobRunner {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        packager: Arc<dyn Packager>,
        staging_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            packager,
            staging_root: staging_root.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Archive location for a job
    pub fn archive_path(&self, job_id: &str) -> PathBuf {
        self.output_dir.join(format!("{}.{}", job_id, ARCHIVE_EXTENSION))
    }

    /// Run a claimed job to a terminal state
    pub async fn run(&self, job: SharedJob) {
        let (job_id, items) = {
            let mut guard = lock_job(&job);
            if let Err(e) = guard.start() {
                warn!(job_id = %guard.id, error = %e, "Job cannot start");
                return;
            }
            (guard.id.clone(), guard.items.clone())
        };

        info!(job_id = %job_id, items = items.len(), "Job started");

        // Staging is gone by the time the terminal state is published
        let outcome = self.execute(&job, &job_id, &items).await;

        let update = {
            let mut guard = lock_job(&job);
            match &outcome {
                Outcome::Packed {
                    archive,
                    item_errors,
                } => guard.complete(archive.clone(), item_errors),
                Outcome::Failed(message) => guard.fail(message.clone()),
            }
        };

        match (update, outcome) {
            (Err(e), _) => {
                error!(job_id = %job_id, error = %e, "Job state update rejected");
            }
            (Ok(()), Outcome::Packed {
                archive,
                item_errors,
            }) => {
                info!(
                    job_id = %job_id,
                    archive = %archive.display(),
                    failed_items = item_errors.len(),
                    "Job completed"
                );
            }
            (Ok(()), Outcome::Failed(message)) => {
                warn!(job_id = %job_id, error = %message, "Job failed");
            }
        }
    }

    async fn execute(&self, job: &SharedJob, job_id: &str, items: &[String]) -> Outcome {
        let staging = match tempfile::Builder::new()
            .prefix(&format!("{}-", job_id))
            .tempdir_in(&self.staging_root)
        {
            Ok(dir) => dir,
            Err(e) => return Outcome::Failed(format!("{}{}", STAGING_ERROR_PREFIX, e)),
        };
        debug!(job_id = %job_id, staging = %staging.path().display(), "Staging directory created");

        let mut downloaded = Vec::with_capacity(items.len());
        let mut item_errors = Vec::new();

        for url in items {
            match self.fetcher.fetch(url, staging.path()).await {
                Ok(path) => {
                    debug!(job_id = %job_id, url = %url, path = %path.display(), "Item fetched");
                    downloaded.push(path);
                }
                Err(e) => {
                    warn!(job_id = %job_id, url = %url, error = %e, "Item fetch failed");
                    item_errors.push(format!("{}: {}", url, e));
                }
            }
            lock_job(job).record_progress(downloaded.len());
        }

        if downloaded.is_empty() {
            return Outcome::Failed(ALL_DOWNLOADS_FAILED.to_string());
        }

        let archive = self.archive_path(job_id);
        let packager = Arc::clone(&self.packager);
        let target = archive.clone();
        let packed =
            tokio::task::spawn_blocking(move || packager.pack(&target, &downloaded)).await;

        let outcome = match packed {
            Ok(Ok(())) => Outcome::Packed {
                archive,
                item_errors,
            },
            Ok(Err(e)) => Outcome::Failed(format!("{}{}", ZIP_ERROR_PREFIX, e)),
            Err(join_err) => Outcome::Failed(format!(
                "{}packaging task failed: {}",
                ZIP_ERROR_PREFIX, join_err
            )),
        };

        if let Err(e) = staging.close() {
            warn!(job_id = %job_id, error = %e, "Failed to remove staging directory");
        }
        outcome
    }
}
