use serde::{Deserialize, Serialize};

/// One entry of an upstream release listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Release {
    #[serde(default, rename = "tag_name")]
    pub tag: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, rename = "html_url")]
    pub url: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
}

/// The release picked for a repository, with its raw upstream timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRelease {
    pub name: String,
    pub published_at: String,
    pub url: String,
}

/// Result of processing one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Notified { name: String, published_at: String },
    NoEligibleRelease,
    AlreadySeen,
    PermanentFailure(String),
    TransientFailureExhausted(String),
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttemptOutcome::Notified { .. } => "notified",
            AttemptOutcome::NoEligibleRelease => "no_eligible_release",
            AttemptOutcome::AlreadySeen => "already_seen",
            AttemptOutcome::PermanentFailure(_) => "permanent_failure",
            AttemptOutcome::TransientFailureExhausted(_) => "transient_failure_exhausted",
        }
    }

    /// Failure reason for outcomes that must be reported, `None` otherwise.
    pub fn problem_reason(&self) -> Option<&str> {
        match self {
            AttemptOutcome::PermanentFailure(reason)
            | AttemptOutcome::TransientFailureExhausted(reason) => Some(reason),
            _ => None,
        }
    }
}

/// A repository that could not be processed during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub repo: String,
    pub reason: String,
}
