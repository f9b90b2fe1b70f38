//! Runtime settings read from the environment (and `.env`, when present).

use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_AMTRAKER_BASE_URL: &str = "https://api-v3.amtraker.com/v3";
pub const DEFAULT_LOG_FILE_PATH: &str = "logs/transit_watch.log";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub amtraker_base_url: String,
    pub http_timeout: Duration,
    pub log_file_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            amtraker_base_url: DEFAULT_AMTRAKER_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
        }
    }
}

impl Settings {
    /// Reads `AMTRAKER_BASE_URL`, `HTTP_TIMEOUT_SECS` and `LOG_FILE_PATH`,
    /// falling back to the defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(url) = lookup("AMTRAKER_BASE_URL") {
            settings.amtraker_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("HTTP_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("HTTP_TIMEOUT_SECS is not a number: {secs:?}"))?;
            settings.http_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = lookup("LOG_FILE_PATH") {
            settings.log_file_path = path;
        }

        Ok(settings)
    }
}
