use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use release_watchbot::config;
use release_watchbot::db;

#[derive(Debug, Parser)]
#[command(author, version, about = "Print the stored seen marker of every repository")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Emit JSON instead of a table
    #[arg(long)]
    json: bool,
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

    let database_url = std::env::var("DATABASE_URL").unwrap_or_else(|_| cfg.database_url());
    let pool = db::init_pool(&database_url).await?;
    db::run_migrations(&pool).await?;

    let rows = db::list_seen(&pool).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for repo in &cfg.github.repos {
        match rows.iter().find(|r| &r.repo == repo) {
            Some(row) => println!("{repo}\t{}\t(updated {})", row.published_at, row.updated_at),
            None => println!("{repo}\t-"),
        }
    }
    for row in rows.iter().filter(|r| !cfg.github.repos.contains(&r.repo)) {
        println!("{}\t{}\t(not configured)", row.repo, row.published_at);
    }
    Ok(())
}
