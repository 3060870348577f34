use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::sync::DEFAULT_DUMP_URL;
use crate::util::env::{env_opt, env_parse_or};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_RESULTS: i64 = 1000;
pub const DEFAULT_DATA_DIR: &str = ".fetch-cache";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 300;

/// Process configuration, resolved from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub host: String,
    /// `PORT` wins so hosted platforms can assign one.
    pub port: u16,
    pub data_dir: PathBuf,
    pub max_results: i64,
    pub dump_url: String,
    pub fetch_timeout: Duration,
    /// Re-run the sync while serving; `None` disables it.
    pub resync_interval: Option<Duration>,
}

impl MirrorConfig {
    pub fn from_env() -> Result<Self> {
        let resync_secs: u64 = env_parse_or("RESYNC_INTERVAL_SECS", 0)?;
        Ok(Self {
            host: env_opt("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse_or("PORT", DEFAULT_PORT)?,
            data_dir: env_opt("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            max_results: env_parse_or("MAX_RESULTS_PER_REQUEST", DEFAULT_MAX_RESULTS)?,
            dump_url: env_opt("TGDB_DUMP_URL").unwrap_or_else(|| DEFAULT_DUMP_URL.to_string()),
            fetch_timeout: Duration::from_secs(env_parse_or(
                "FETCH_TIMEOUT_SECS",
                DEFAULT_FETCH_TIMEOUT_SECS,
            )?),
            resync_interval: (resync_secs > 0).then(|| Duration::from_secs(resync_secs)),
        })
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            max_results: DEFAULT_MAX_RESULTS,
            dump_url: DEFAULT_DUMP_URL.to_string(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            resync_interval: None,
        }
    }
}
