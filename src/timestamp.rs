//! Canonical form for upstream publish timestamps.
//!
//! Seen markers are compared as plain strings, so every timestamp stored or
//! compared must first go through [`normalize`]. The canonical form is RFC 3339
//! in UTC with an explicit `+00:00` offset, which sorts lexicographically in
//! chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

/// Normalize an upstream timestamp into its canonical UTC form.
///
/// Inputs without a recognizable offset are returned unchanged.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::AutoSi, false);
    }
    match trimmed.strip_suffix('Z') {
        Some(head) => format!("{head}+00:00"),
        None => raw.to_string(),
    }
}

/// True when `candidate` should replace `marker` as the seen marker.
pub fn is_newer(candidate: &str, marker: Option<&str>) -> bool {
    marker.map_or(true, |current| current < candidate)
}

/// Human readable rendering used in notifications; falls back to the input.
pub fn display(canonical: &str) -> String {
    DateTime::parse_from_rfc3339(canonical)
        .map(|dt| {
            dt.with_timezone(&Utc)
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string()
        })
        .unwrap_or_else(|_| canonical.to_string())
}
