//! Release listing over the GitHub REST API.
//!
//! Fetch failures are split into two kinds for the retry loop:
//!
//! - **Transient**: upstream 5xx, connection failures and timeouts. Safe to
//!   retry after a delay.
//! - **Permanent**: any other non-success status, an undecodable body, or an
//!   error nobody classified. Retrying would not change the answer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::Release;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Permanent,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("server error: HTTP {status}")]
    Server { status: u16 },
    #[error("HTTP {status}: {message}")]
    Client { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl FetchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FetchError::Server { .. } | FetchError::Transport(_) => FailureKind::Transient,
            FetchError::Client { .. } | FetchError::Malformed(_) | FetchError::Unexpected(_) => {
                FailureKind::Permanent
            }
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind() == FailureKind::Transient
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status.is_server_error() {
            return FetchError::Server {
                status: status.as_u16(),
            };
        }
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        FetchError::Client {
            status: status.as_u16(),
            message,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() || err.is_request() || err.is_body() {
            FetchError::Transport(err.to_string())
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Unexpected(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Source of release listings for a repository.
///
/// Implementations must return releases newest-first: callers pick the first
/// eligible entry and never re-sort.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn list_releases(&self, repo: &str) -> Result<Vec<Release>, FetchError>;
}

#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    per_page: u32,
}

impl fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("per_page", &self.per_page)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        // Url::join drops the last path segment unless it ends with '/'.
        let mut base = cfg.github.api_base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .with_context(|| format!("invalid github.api_base: {}", cfg.github.api_base))?;
        Self::with_base_url(base_url, cfg.github.per_page, cfg.request_timeout())
    }

    pub fn with_base_url(base_url: Url, per_page: u32, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("release-watchbot/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url,
            per_page,
        })
    }

    fn releases_url(&self, repo: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base_url
            .join(&format!("repos/{repo}/releases"))
            .map_err(|e| FetchError::Unexpected(format!("invalid release URL for {repo}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn list_releases(&self, repo: &str) -> Result<Vec<Release>, FetchError> {
        let url = self.releases_url(repo)?;
        debug!(%url, "fetching releases");
        let res = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            warn!(repo, status = status.as_u16(), "release listing failed");
            return Err(FetchError::from_status(status, &body));
        }

        serde_json::from_str::<Vec<Release>>(&body)
            .map_err(|e| FetchError::Malformed(format!("invalid release list JSON: {e}")))
    }
}
