//! Configuration loader and validator for the release watcher.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::engine::RetryPolicy;

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY_SECONDS: u64 = 300;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_PER_PAGE: u32 = 10;
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com/";

static REPO_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$").expect("valid repo regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub telegram: Telegram,
    pub github: GitHub,
}

/// Process-level settings: storage location, scheduling and retry tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
    /// Seconds between passes. When absent the process runs a single pass.
    #[serde(default)]
    pub poll_interval_seconds: Option<u64>,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_seconds")]
    pub retry_delay_seconds: u64,
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Telegram {
    pub bot_token: String,
    /// Numeric chat id (e.g. `-1001234567890`) or a public `@channel` name.
    pub chat_id: String,
}

/// Release listing settings and the watched repositories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitHub {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    pub repos: Vec<String>,
}

fn default_retry_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_retry_delay_seconds() -> u64 {
    DEFAULT_RETRY_DELAY_SECONDS
}

fn default_api_base() -> String {
    DEFAULT_GITHUB_API_BASE.to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_request_timeout_seconds() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }

    /// Default SQLite location under the data directory.
    pub fn database_url(&self) -> String {
        format!(
            "sqlite://{}/releases.db",
            self.app.data_dir.trim_end_matches('/')
        )
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.app.poll_interval_seconds.map(Duration::from_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.app.retry_attempts,
            Duration::from_secs(self.app.retry_delay_seconds),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.github.request_timeout_seconds)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }
    if cfg.app.poll_interval_seconds == Some(0) {
        return Err(ConfigError::Invalid("app.poll_interval_seconds must be > 0"));
    }
    if cfg.app.retry_attempts == 0 {
        return Err(ConfigError::Invalid("app.retry_attempts must be >= 1"));
    }

    if cfg.telegram.bot_token.trim().is_empty() {
        return Err(ConfigError::Invalid("telegram.bot_token must be non-empty"));
    }
    if cfg.telegram.chat_id.trim().is_empty() {
        return Err(ConfigError::Invalid("telegram.chat_id must be non-empty"));
    }

    if cfg.github.api_base.trim().is_empty() {
        return Err(ConfigError::Invalid("github.api_base must be non-empty"));
    }
    if cfg.github.per_page == 0 || cfg.github.per_page > 100 {
        return Err(ConfigError::Invalid("github.per_page must be within 1..=100"));
    }
    if cfg.github.request_timeout_seconds == 0 {
        return Err(ConfigError::Invalid(
            "github.request_timeout_seconds must be > 0",
        ));
    }
    if cfg.github.repos.is_empty() {
        return Err(ConfigError::Invalid("github.repos must list at least one repository"));
    }
    let mut seen = HashSet::new();
    for repo in &cfg.github.repos {
        if !REPO_ID.is_match(repo) {
            return Err(ConfigError::Invalid(
                "github.repos entries must look like owner/name",
            ));
        }
        if !seen.insert(repo.as_str()) {
            return Err(ConfigError::Invalid("github.repos must not contain duplicates"));
        }
    }

    Ok(())
}

/// Example configuration document.
pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"
  poll_interval_seconds: 3600
  retry_attempts: 5
  retry_delay_seconds: 300

telegram:
  bot_token: "YOUR_TELEGRAM_BOT_TOKEN"
  chat_id: "-1001234567890"

github:
  api_base: "https://api.github.com/"
  per_page: 10
  request_timeout_seconds: 10
  repos:
    - "go-gitea/gitea"
    - "PowerShell/PowerShell"
    - "XTLS/Xray-core"
"#
}
