use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use release_watchbot::batch::BatchRunner;
use release_watchbot::config;
use release_watchbot::db;
use release_watchbot::engine::AttemptEngine;
use release_watchbot::github::GitHubClient;
use release_watchbot::notifier::TelegramNotifier;
use release_watchbot::seen::SqliteSeenStore;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Run a single pass and exit, even if a poll interval is configured
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.database_url());
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let engine = AttemptEngine::new(
        Arc::new(GitHubClient::from_config(&cfg)?),
        Arc::new(SqliteSeenStore::new(pool)),
        Arc::new(TelegramNotifier::from_config(&cfg)),
        cfg.retry_policy(),
    );
    let runner = BatchRunner::new(engine, cfg.github.repos.clone());
    let interval = if args.once { None } else { cfg.poll_interval() };

    info!(
        repos = runner.repos().len(),
        ?interval,
        "starting release watcher"
    );

    let Some(interval) = interval else {
        let problems = runner.run_cycle().await?;
        info!(problems = problems.len(), "single pass complete");
        return Ok(());
    };

    loop {
        match runner.run_cycle().await {
            Ok(problems) if problems.is_empty() => {}
            Ok(problems) => warn!(problems = problems.len(), "pass finished with problems"),
            Err(err) => error!(?err, "pass failed"),
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
