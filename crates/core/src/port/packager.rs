// Packager Port
// Bundles staged files into one archive, replacing the output atomically

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PackError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Archive(String),
}

/// Packager trait
///
/// Blocking by contract: callers run it on the blocking pool.
pub trait Packager: Send + Sync {
    /// Write `files` into a fresh archive at `output`
    ///
    /// Entries are named by file basename, in the given order. On error the
    /// previous content of `output` (if any) is left untouched.
    fn pack(&self, output: &Path, files: &[PathBuf]) -> Result<(), PackError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock packager behavior
    #[derive(Debug, Clone)]
    pub enum MockPackBehavior {
        /// Write a listing of entry names to `output`
        Success,
        /// Always fail with message
        Fail(String),
    }

    /// Mock Packager for testing
    pub struct MockPackager {
        behavior: MockPackBehavior,
        packed: Mutex<Vec<Vec<String>>>,
    }

    impl MockPackager {
        pub fn new(behavior: MockPackBehavior) -> Self {
            Self {
                behavior,
                packed: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockPackBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockPackBehavior::Fail(message.into()))
        }

        /// Entry names of every pack call, in call order
        pub fn packed(&self) -> Vec<Vec<String>> {
            self.packed.lock().unwrap().clone()
        }
    }

    impl Packager for MockPackager {
        fn pack(&self, output: &Path, files: &[PathBuf]) -> Result<(), PackError> {
            let names: Vec<String> = files
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            self.packed.lock().unwrap().push(names.clone());

            match &self.behavior {
                MockPackBehavior::Success => {
                    std::fs::write(output, names.join("\n"))?;
                    Ok(())
                }
                MockPackBehavior::Fail(msg) => Err(PackError::Archive(msg.clone())),
            }
        }
    }
}
