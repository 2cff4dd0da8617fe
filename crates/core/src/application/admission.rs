// Admission Gate - process-wide limit on simultaneously running jobs
//
// Fixed token pool, non-blocking acquire. A permit is returned to the pool
// when dropped, so every exit path of a job (including a panic) releases it.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// Slot held by a running job
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Try to take a slot without waiting; `None` when the gate is full
    pub fn try_admit(&self) -> Option<AdmissionPermit> {
        Arc::clone(&self.permits)
            .try_acquire_owned()
            .ok()
            .map(|permit| AdmissionPermit { _permit: permit })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Jobs currently holding a slot
    pub fn running(&self) -> usize {
        self.capacity - self.available()
    }
}
