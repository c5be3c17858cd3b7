//! Episode identifier extraction from cross-reference guids.

use crate::types::{EpisodeId, PlaybackEvent};

/// Namespace tag identifying TheTVDB guids, which TV Time keys episodes by.
pub const TVDB_NAMESPACE: &str = "tvdb";

/// Scheme prefix stripped from a TheTVDB guid value.
pub const TVDB_SCHEME: &str = "tvdb://";

/// Returns the TheTVDB episode id carried by the event, if any.
///
/// The last cross-reference whose namespace contains `tvdb` wins. A match
/// whose stripped value is blank counts as no match.
pub fn extract_episode_id(event: &PlaybackEvent) -> Option<EpisodeId> {
    let value = event
        .cross_references
        .iter()
        .rev()
        .find(|xref| xref.namespace.contains(TVDB_NAMESPACE))?
        .value
        .replace(TVDB_SCHEME, "");

    if value.trim().is_empty() {
        None
    } else {
        Some(EpisodeId::new(value))
    }
}
