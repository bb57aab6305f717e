use crate::model::{Release, SelectedRelease};

/// Pick the release to announce from a newest-first listing.
///
/// Drafts, pre-releases and entries without a publish timestamp are skipped;
/// the first remaining entry wins. The listing order is trusted as is.
pub fn select_newest(releases: &[Release]) -> Option<SelectedRelease> {
    releases.iter().find_map(|r| {
        if r.draft || r.prerelease {
            return None;
        }
        let published_at = r.published_at.as_deref().filter(|s| !s.trim().is_empty())?;
        let name = [r.tag.as_deref(), r.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        Some(SelectedRelease {
            name: name.to_string(),
            published_at: published_at.to_string(),
            url: r.url.clone().unwrap_or_default(),
        })
    })
}
