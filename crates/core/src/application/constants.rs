// Application constants (no magic values)

/// Default number of jobs allowed to run at the same time
pub const DEFAULT_MAX_PARALLEL: usize = 3;

/// Default staging root (one private sub-directory per running job)
pub const DEFAULT_STAGING_DIR: &str = "tmp";

/// Default directory holding finished archives
pub const DEFAULT_OUTPUT_DIR: &str = "results";

/// Archive file extension (archives are named `<job_id>.zip`)
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Terminal error text when no item could be fetched
pub const ALL_DOWNLOADS_FAILED: &str = "all downloads failed";

/// Prefix for packaging failures
pub const ZIP_ERROR_PREFIX: &str = "zip error: ";

/// Prefix for staging directory failures
pub const STAGING_ERROR_PREFIX: &str = "staging error: ";

/// Error text when the runner task panicked
pub const RUNNER_PANICKED: &str = "internal error: job runner panicked";
