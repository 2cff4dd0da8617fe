//! Daemon configuration from `ZIPPER_*` environment variables

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use zipper_api_http::HttpServerConfig;
use zipper_core::application::constants::{
    DEFAULT_MAX_PARALLEL, DEFAULT_OUTPUT_DIR, DEFAULT_STAGING_DIR,
};
use zipper_core::application::ManagerConfig;
use zipper_infra_system::FetchSettings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_FILE_MB: u64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub host: String,
    pub port: u16,
    pub max_parallel: usize,
    pub staging_dir: PathBuf,
    pub output_dir: PathBuf,
    pub fetch_timeout: Duration,
    pub max_file_bytes: u64,
    pub log_format: LogFormat,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_parallel: usize = parse_or(&lookup, "ZIPPER_MAX_PARALLEL", DEFAULT_MAX_PARALLEL)?;
        if max_parallel == 0 {
            bail!("ZIPPER_MAX_PARALLEL must be at least 1");
        }

        let max_file_mb: u64 = parse_or(&lookup, "ZIPPER_MAX_FILE_MB", DEFAULT_MAX_FILE_MB)?;
        let timeout_secs: u64 =
            parse_or(&lookup, "ZIPPER_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;

        let log_format = match lookup("ZIPPER_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            host: lookup("ZIPPER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "ZIPPER_PORT", DEFAULT_PORT)?,
            max_parallel,
            staging_dir: lookup("ZIPPER_STAGING_DIR")
                .unwrap_or_else(|| DEFAULT_STAGING_DIR.to_string())
                .into(),
            output_dir: lookup("ZIPPER_OUTPUT_DIR")
                .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string())
                .into(),
            fetch_timeout: Duration::from_secs(timeout_secs),
            max_file_bytes: max_file_mb.saturating_mul(1024 * 1024),
            log_format,
        })
    }

    pub fn manager(&self) -> ManagerConfig {
        ManagerConfig {
            max_parallel: self.max_parallel,
            staging_dir: self.staging_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }

    pub fn fetch(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: self.fetch_timeout,
            max_bytes: self.max_file_bytes,
        }
    }

    pub fn http(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            ..Default::default()
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
