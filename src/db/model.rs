//! Database entity models used by repositories.

use chrono::NaiveDateTime;
use serde::Serialize;

/// Seen marker row: the canonical publish timestamp of the last release that
/// was announced for `repo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SeenRelease {
    pub repo: String,
    pub published_at: String,
    pub updated_at: NaiveDateTime,
}
