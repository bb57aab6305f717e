//! One pass over the configured repositories.
//!
//! Repositories are processed one at a time in configured order, so
//! announcements and the problem report come out in a deterministic order and
//! the upstream API never sees more than one request from us at a time.

use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::engine::AttemptEngine;
use crate::model::{AttemptOutcome, Problem};
use crate::report;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub notified: usize,
    pub already_seen: usize,
    pub no_release: usize,
    pub failed: usize,
}

impl PassStats {
    fn record(&mut self, outcome: &AttemptOutcome) {
        match outcome {
            AttemptOutcome::Notified { .. } => self.notified += 1,
            AttemptOutcome::AlreadySeen => self.already_seen += 1,
            AttemptOutcome::NoEligibleRelease => self.no_release += 1,
            AttemptOutcome::PermanentFailure(_)
            | AttemptOutcome::TransientFailureExhausted(_) => self.failed += 1,
        }
    }
}

#[derive(Clone)]
pub struct BatchRunner {
    engine: AttemptEngine,
    repos: Vec<String>,
}

impl BatchRunner {
    pub fn new(engine: AttemptEngine, repos: Vec<String>) -> Self {
        Self { engine, repos }
    }

    pub fn repos(&self) -> &[String] {
        &self.repos
    }

    /// Run the engine for every repository and collect the ones that failed.
    ///
    /// Returns `Err` only when the seen state cannot be read or a release
    /// announcement cannot be delivered; the pass stops there.
    #[instrument(skip_all, fields(repos = self.repos.len()))]
    pub async fn run_pass(&self) -> Result<Vec<Problem>> {
        let seen = self
            .engine
            .store()
            .get_all()
            .await
            .context("failed to read seen state")?;

        let mut stats = PassStats::default();
        let mut problems = Vec::new();
        for repo in &self.repos {
            let marker = seen.get(repo).map(String::as_str);
            let outcome = self.engine.process(repo, marker).await?;
            info!(repo = %repo, outcome = outcome.as_str(), "repository processed");
            stats.record(&outcome);
            if let Some(reason) = outcome.problem_reason() {
                problems.push(Problem {
                    repo: repo.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        info!(
            notified = stats.notified,
            already_seen = stats.already_seen,
            no_release = stats.no_release,
            failed = stats.failed,
            "pass finished"
        );
        Ok(problems)
    }

    /// One pass followed by the aggregate problem report.
    pub async fn run_cycle(&self) -> Result<Vec<Problem>> {
        let problems = self.run_pass().await?;
        report::report_problems(self.engine.notifier(), &problems).await?;
        Ok(problems)
    }
}
