//! Client configuration.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/slideship/client.toml`
//! - Windows: `%APPDATA%/slideship/client.toml`
//!
//! Every key is optional. A missing default file means built-in defaults; a
//! file named explicitly with `--config` must exist.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use slideship_client::{DispatchPolicy, Endpoints, RetryPolicy, UploaderConfig};
use slideship_transfer::DEFAULT_CHUNK_SIZE;

/// Largest file the client will upload unless configured otherwise.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the conversion server.
    pub server_url: String,
    pub chunk_size: u64,
    /// Attempts per chunk, including the first.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    /// Multiplier applied to the retry delay after each failed attempt.
    pub retry_backoff: f64,
    pub max_retry_delay_ms: u64,
    pub inter_chunk_delay_ms: u64,
    /// Whole-request timeout; `0` disables it.
    pub request_timeout_secs: u64,
    /// Chunks in flight at once; `1` keeps uploads strictly sequential.
    pub parallel_chunks: usize,
    pub max_file_size: u64,
    /// Where `--resume` keeps its state. Defaults next to the config file.
    pub state_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        Self {
            server_url: Endpoints::default().base_url().to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_retries: retry.max_attempts,
            retry_delay_ms: retry.initial_delay.as_millis() as u64,
            retry_backoff: retry.backoff_factor,
            max_retry_delay_ms: retry.max_delay.as_millis() as u64,
            inter_chunk_delay_ms: 100,
            request_timeout_secs: 300,
            parallel_chunks: 1,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            state_dir: None,
        }
    }
}

impl ClientConfig {
    /// Loads `path`, or the default location when `path` is `None`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = config_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: ClientConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Rejects values no upload could work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            bail!("server_url must be an http(s) URL: {}", self.server_url);
        }
        if self.chunk_size == 0 {
            bail!("chunk_size must be greater than zero");
        }
        if self.max_file_size == 0 {
            bail!("max_file_size must be greater than zero");
        }
        if !self.retry_backoff.is_finite() || self.retry_backoff <= 0.0 {
            bail!("retry_backoff must be a positive number");
        }
        Ok(())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.server_url)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn uploader_config(&self) -> UploaderConfig {
        UploaderConfig {
            chunk_size: self.chunk_size,
            retry: RetryPolicy {
                max_attempts: self.max_retries,
                initial_delay: Duration::from_millis(self.retry_delay_ms),
                backoff_factor: self.retry_backoff,
                max_delay: Duration::from_millis(self.max_retry_delay_ms),
            },
            inter_chunk_delay: Duration::from_millis(self.inter_chunk_delay_ms),
            dispatch: DispatchPolicy::from_concurrency(self.parallel_chunks),
        }
    }

    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            config_path()
                .parent()
                .map(|dir| dir.join("state"))
                .unwrap_or_else(|| PathBuf::from("slideship-state"))
        })
    }
}

/// Returns the platform-specific configuration file path.
pub fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("slideship").join("client.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("slideship")
            .join("client.toml")
    }
}
