use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::db::{self, Pool};

/// Persistent map from repository to the canonical timestamp of the last
/// announced release.
#[async_trait]
pub trait SeenStore: Send + Sync {
    async fn get_all(&self) -> Result<HashMap<String, String>>;

    /// Upsert the marker for `repo`. Must be durable when this returns.
    async fn set(&self, repo: &str, published_at: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SqliteSeenStore {
    pool: Pool,
}

impl SqliteSeenStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

#[async_trait]
impl SeenStore for SqliteSeenStore {
    async fn get_all(&self) -> Result<HashMap<String, String>> {
        let rows = db::list_seen(&self.pool)
            .await
            .context("failed to load seen releases")?;
        Ok(rows
            .into_iter()
            .map(|row| (row.repo, row.published_at))
            .collect())
    }

    async fn set(&self, repo: &str, published_at: &str) -> Result<()> {
        let written = db::upsert_seen(&self.pool, repo, published_at)
            .await
            .with_context(|| format!("failed to record seen release for {repo}"))?;
        if !written {
            debug!(repo, published_at, "stored marker already at or past this release");
        }
        Ok(())
    }
}
