// ID Provider Port (for deterministic testing)

use crate::domain::JobId;
use crate::error::{AppError, Result};
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes behind each identifier (128 bits)
const ID_BYTES: usize = 16;

/// ID provider interface (allows deterministic IDs in tests)
pub trait IdProvider: Send + Sync {
    /// Generate a new unique job ID
    fn generate_id(&self) -> Result<JobId>;
}

/// OS-entropy provider (production): 128 random bits, hex encoded
pub struct RandomIdProvider;

impl IdProvider for RandomIdProvider {
    fn generate_id(&self) -> Result<JobId> {
        let mut bytes = [0u8; ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| AppError::IdGeneration(e.to_string()))?;
        Ok(hex::encode(bytes))
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Deterministic IDs: `job-1`, `job-2`, ...
    #[derive(Default)]
    pub struct SequentialIdProvider {
        counter: AtomicU64,
    }

    impl SequentialIdProvider {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl IdProvider for SequentialIdProvider {
        fn generate_id(&self) -> Result<JobId> {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("job-{}", n))
        }
    }
}
