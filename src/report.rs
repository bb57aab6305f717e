use anyhow::{Context, Result};
use tracing::{info, instrument};

use crate::model::Problem;
use crate::notifier::{MessageFormat, Notifier};

const REPORT_HEADER: &str = "Could not fetch releases for the following repositories:";

/// Aggregate message for a pass, or `None` when nothing went wrong.
pub fn compose(problems: &[Problem]) -> Option<String> {
    if problems.is_empty() {
        return None;
    }
    let mut lines = Vec::with_capacity(problems.len() + 1);
    lines.push(REPORT_HEADER.to_string());
    lines.extend(problems.iter().map(|p| format!("- {}: {}", p.repo, p.reason)));
    Some(lines.join("\n"))
}

/// Send one aggregate report covering every problem of the pass.
#[instrument(skip_all, fields(problems = problems.len()))]
pub async fn report_problems(notifier: &dyn Notifier, problems: &[Problem]) -> Result<()> {
    let Some(text) = compose(problems) else {
        return Ok(());
    };
    notifier
        .send(&text, MessageFormat::Plain)
        .await
        .context("failed to deliver problem report")?;
    info!(count = problems.len(), "problem report sent");
    Ok(())
}
