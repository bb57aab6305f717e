//! Per-repository attempt: fetch, select, compare, persist, notify.
//!
//! Transient fetch failures are retried up to [`RetryPolicy::max_attempts`]
//! times with a fixed delay between attempts. Permanent failures end the
//! attempt at once. The seen marker is written before the notification is
//! sent: a crash in between loses one announcement rather than repeating it.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_SECONDS};
use crate::github::ReleaseSource;
use crate::model::{AttemptOutcome, Release};
use crate::notifier::{self, MessageFormat, Notifier};
use crate::seen::SeenStore;
use crate::selector;
use crate::timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETRY_ATTEMPTS,
            Duration::from_secs(DEFAULT_RETRY_DELAY_SECONDS),
        )
    }
}

impl RetryPolicy {
    /// At least one fetch is always made.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[derive(Clone)]
pub struct AttemptEngine {
    source: Arc<dyn ReleaseSource>,
    store: Arc<dyn SeenStore>,
    notifier: Arc<dyn Notifier>,
    policy: RetryPolicy,
}

impl AttemptEngine {
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        store: Arc<dyn SeenStore>,
        notifier: Arc<dyn Notifier>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            policy,
        }
    }

    pub fn store(&self) -> &dyn SeenStore {
        self.store.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Process one repository against its current seen `marker`.
    ///
    /// Only a failed notification delivery is returned as `Err`; every other
    /// failure is folded into the outcome.
    #[instrument(skip_all, fields(repo = %repo))]
    pub async fn process(&self, repo: &str, marker: Option<&str>) -> Result<AttemptOutcome> {
        let mut attempt = 0;
        let releases = loop {
            attempt += 1;
            match self.source.list_releases(repo).await {
                Ok(releases) => break releases,
                Err(err) if err.is_transient() => {
                    if attempt >= self.policy.max_attempts {
                        warn!(repo, attempt, %err, "giving up after transient failures");
                        return Ok(AttemptOutcome::TransientFailureExhausted(format!(
                            "still failing after {attempt} attempts: {err}"
                        )));
                    }
                    warn!(
                        repo,
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_secs = self.policy.delay.as_secs(),
                        %err,
                        "transient fetch failure; retrying"
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
                Err(err) => {
                    warn!(repo, attempt, %err, "permanent fetch failure");
                    return Ok(AttemptOutcome::PermanentFailure(err.to_string()));
                }
            }
        };

        self.apply(repo, marker, &releases).await
    }

    async fn apply(
        &self,
        repo: &str,
        marker: Option<&str>,
        releases: &[Release],
    ) -> Result<AttemptOutcome> {
        let Some(release) = selector::select_newest(releases) else {
            debug!(repo, listed = releases.len(), "no eligible release");
            return Ok(AttemptOutcome::NoEligibleRelease);
        };

        let published_at = timestamp::normalize(&release.published_at);
        if !timestamp::is_newer(&published_at, marker) {
            debug!(repo, %published_at, "release already seen");
            return Ok(AttemptOutcome::AlreadySeen);
        }

        if let Err(err) = self.store.set(repo, &published_at).await {
            warn!(repo, ?err, "failed to persist seen marker");
            return Ok(AttemptOutcome::PermanentFailure(format!(
                "unexpected error: {err:#}"
            )));
        }

        let text = notifier::release_message(repo, &release, &published_at);
        self.notifier
            .send(&text, MessageFormat::Html)
            .await
            .with_context(|| format!("failed to announce {} for {repo}", release.name))?;
        info!(repo, name = %release.name, %published_at, "announced new release");

        Ok(AttemptOutcome::Notified {
            name: release.name,
            published_at,
        })
    }
}
