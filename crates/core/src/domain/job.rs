// Job Domain Model

use super::error::{DomainError, Result};
use super::item::validate_item_url;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Job ID (128-bit random, hex encoded)
pub type JobId = String;

/// Maximum number of items a single job may carry
pub const MAX_ITEMS: usize = 3;

/// Job State
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Running,
    Done,
    Error,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Done => "done",
            JobState::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item counters returned after a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ItemCount {
    pub added: usize,
    pub limit: usize,
}

/// Job Entity
///
/// Always accessed through its owning lock (see `application::job_store`).
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub items: Vec<String>,
    pub started: bool,
    pub state: JobState,
    pub error_text: String,
    pub result_path: Option<PathBuf>,
    pub added: usize,
    pub done: usize,
}

/// Point-in-time copy of a job, safe to serialize outside the lock
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSnapshot {
    pub id: JobId,
    pub items: Vec<String>,
    pub started: bool,
    pub state: JobState,
    pub error_text: String,
    pub result_path: Option<PathBuf>,
    pub added: usize,
    pub done: usize,
}

impl Job {
    /// Create an empty QUEUED job
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            started: false,
            state: JobState::Queued,
            error_text: String::new(),
            result_path: None,
            added: 0,
            done: 0,
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id.clone(),
            items: self.items.clone(),
            started: self.started,
            state: self.state,
            error_text: self.error_text.clone(),
            result_path: self.result_path.clone(),
            added: self.added,
            done: self.done,
        }
    }

    /// Append a validated item URL
    ///
    /// Only legal before the job was ever started.
    pub fn add_item(&mut self, raw_url: &str) -> Result<ItemCount> {
        if self.started || self.state != JobState::Queued {
            return Err(DomainError::AlreadyStarted);
        }
        if self.items.len() >= MAX_ITEMS {
            return Err(DomainError::TooManyItems { limit: MAX_ITEMS });
        }
        validate_item_url(raw_url)?;

        self.items.push(raw_url.to_string());
        self.added = self.items.len();
        Ok(ItemCount {
            added: self.added,
            limit: MAX_ITEMS,
        })
    }

    /// Claim the job for a run attempt (sets `started`)
    pub fn claim(&mut self) -> Result<()> {
        if self.started {
            return Err(DomainError::AlreadyStarted);
        }
        if self.items.is_empty() {
            return Err(DomainError::NoItems);
        }
        self.started = true;
        self.state = JobState::Queued;
        Ok(())
    }

    /// Undo a claim after admission was refused, so the job stays startable
    pub fn release_claim(&mut self) {
        if self.state == JobState::Queued {
            self.started = false;
        }
    }

    /// Transition QUEUED -> RUNNING, resetting progress
    pub fn start(&mut self) -> Result<()> {
        if !self.started || self.state != JobState::Queued {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Running.to_string(),
            });
        }
        self.state = JobState::Running;
        self.error_text.clear();
        self.done = 0;
        Ok(())
    }

    pub fn record_progress(&mut self, done: usize) {
        self.done = done;
    }

    /// Transition RUNNING -> DONE, recording the archive and any per-item errors
    pub fn complete(&mut self, result_path: PathBuf, item_errors: &[String]) -> Result<()> {
        if self.state != JobState::Running {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Done.to_string(),
            });
        }
        self.state = JobState::Done;
        self.result_path = Some(result_path);
        if !item_errors.is_empty() {
            self.error_text = item_errors.join("; ");
        }
        Ok(())
    }

    /// Transition RUNNING -> ERROR
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        if self.state != JobState::Running {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: JobState::Error.to_string(),
            });
        }
        self.state = JobState::Error;
        self.error_text = message.into();
        Ok(())
    }

    /// Force a non-terminal job into ERROR (runner crashed mid-flight)
    pub fn abort(&mut self, message: impl Into<String>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = JobState::Error;
        self.error_text = message.into();
    }
}
