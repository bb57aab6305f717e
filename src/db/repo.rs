use super::model::SeenRelease;
use anyhow::Result;
use sqlx::SqlitePool;
use tracing::instrument;

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Markers must be on disk before the notification goes out.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and ask SQLite to create the file. In-memory URLs and other
/// schemes are returned untouched.
fn prepare_sqlite_url(url: &str) -> String {
    let Some(rest) = url.strip_prefix("sqlite:") else {
        return url.to_string();
    };
    if rest.starts_with(":memory") {
        return url.to_string();
    }

    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match rest.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (rest, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(tail), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), tail),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let query = match query_part {
        Some(q) if q.split('&').any(|kv| kv.starts_with("mode=")) => q.to_string(),
        Some(q) => format!("{q}&mode=rwc"),
        None => "mode=rwc".to_string(),
    };
    format!("sqlite://{expanded_path}?{query}")
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[instrument(skip_all)]
pub async fn list_seen(pool: &Pool) -> Result<Vec<SeenRelease>> {
    let rows = sqlx::query_as::<_, SeenRelease>(
        "SELECT repo, published_at, updated_at FROM seen_releases ORDER BY repo",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[instrument(skip_all)]
pub async fn seen_marker(pool: &Pool, repo: &str) -> Result<Option<String>> {
    let marker = sqlx::query_scalar::<_, String>(
        "SELECT published_at FROM seen_releases WHERE repo = ?",
    )
    .bind(repo)
    .fetch_optional(pool)
    .await?;
    Ok(marker)
}

/// Insert or advance the seen marker for `repo`.
///
/// An existing marker is only replaced by a strictly greater one. Returns
/// whether a row was written.
#[instrument(skip_all, fields(repo = %repo))]
pub async fn upsert_seen(pool: &Pool, repo: &str, published_at: &str) -> Result<bool> {
    let res = sqlx::query(
        "INSERT INTO seen_releases (repo, published_at) VALUES (?, ?) \
         ON CONFLICT(repo) DO UPDATE SET published_at = excluded.published_at, updated_at = CURRENT_TIMESTAMP \
         WHERE excluded.published_at > seen_releases.published_at",
    )
    .bind(repo)
    .bind(published_at)
    .execute(pool)
    .await?;
    Ok(res.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_pool() -> Pool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn upsert_inserts_and_advances() {
        let pool = setup_pool().await;
        assert!(seen_marker(&pool, "a/b").await.unwrap().is_none());

        assert!(upsert_seen(&pool, "a/b", "2024-01-01T00:00:00+00:00").await.unwrap());
        assert_eq!(
            seen_marker(&pool, "a/b").await.unwrap().as_deref(),
            Some("2024-01-01T00:00:00+00:00")
        );

        assert!(upsert_seen(&pool, "a/b", "2024-02-01T00:00:00+00:00").await.unwrap());
        assert_eq!(
            seen_marker(&pool, "a/b").await.unwrap().as_deref(),
            Some("2024-02-01T00:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn upsert_never_moves_marker_backwards() {
        let pool = setup_pool().await;
        upsert_seen(&pool, "a/b", "2024-02-01T00:00:00+00:00").await.unwrap();

        assert!(!upsert_seen(&pool, "a/b", "2024-01-01T00:00:00+00:00").await.unwrap());
        assert!(!upsert_seen(&pool, "a/b", "2024-02-01T00:00:00+00:00").await.unwrap());
        assert_eq!(
            seen_marker(&pool, "a/b").await.unwrap().as_deref(),
            Some("2024-02-01T00:00:00+00:00")
        );
    }

    #[tokio::test]
    async fn list_is_ordered_by_repo() {
        let pool = setup_pool().await;
        upsert_seen(&pool, "z/z", "2024-01-01T00:00:00+00:00").await.unwrap();
        upsert_seen(&pool, "a/a", "2023-01-01T00:00:00+00:00").await.unwrap();
        let rows = list_seen(&pool).await.unwrap();
        let repos: Vec<_> = rows.iter().map(|r| r.repo.as_str()).collect();
        assert_eq!(repos, vec!["a/a", "z/z"]);
    }

    #[test]
    fn sqlite_url_normalization() {
        assert_eq!(prepare_sqlite_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(prepare_sqlite_url("postgres://x"), "postgres://x");

        let td = tempfile::tempdir().unwrap();
        let db = td.path().join("nested/releases.db");
        let url = prepare_sqlite_url(&format!("sqlite://{}", db.display()));
        assert_eq!(url, format!("sqlite://{}?mode=rwc", db.display()));
        assert!(db.parent().unwrap().exists());

        let url = prepare_sqlite_url(&format!("sqlite://{}?mode=ro", db.display()));
        assert!(url.ends_with("?mode=ro"));
    }
}
