use crate::errors::PipelineError;
use crate::stats_loader::BatchCommitMode;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_STATS_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub database_url: String,
    pub base_url: String,
    pub request_delay: Duration,
    /// `None` waits on the API indefinitely.
    pub http_timeout: Option<Duration>,
    pub stats_batch_size: usize,
    pub commit_mode: BatchCommitMode,
}

impl PipelineConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            http_timeout: None,
            stats_batch_size: DEFAULT_STATS_BATCH_SIZE,
            commit_mode: BatchCommitMode::default(),
        }
    }

    /// Load from the process environment, reading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, PipelineError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, PipelineError> {
        let database_url = vars
            .get("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| PipelineError::ConfigError("DATABASE_URL is not set".to_string()))?;

        let mut config = Self::new(database_url.clone());

        if let Some(base_url) = vars.get("JIKAN_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = parse_var::<u64>(&vars, "JIKAN_REQUEST_DELAY_MS")? {
            config.request_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&vars, "JIKAN_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Some(Duration::from_secs(secs));
        }
        if let Some(size) = parse_var::<usize>(&vars, "STATS_BATCH_SIZE")? {
            if size == 0 {
                return Err(PipelineError::ConfigError(
                    "STATS_BATCH_SIZE must be greater than zero".to_string(),
                ));
            }
            config.stats_batch_size = size;
        }
        if let Some(mode) = parse_var::<BatchCommitMode>(&vars, "STATS_COMMIT_MODE")? {
            config.commit_mode = mode;
        }

        Ok(config)
    }

    pub fn anime_url(&self) -> String {
        format!("{}/anime", self.base_url)
    }
}

fn parse_var<T>(vars: &HashMap<String, String>, key: &str) -> Result<Option<T>, PipelineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match vars.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PipelineError::ConfigError(format!("{key}={raw:?}: {e}"))),
    }
}
