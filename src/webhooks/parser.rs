//! Plex webhook payload parser.
//!
//! Plex posts its webhooks as `multipart/form-data` with the JSON document in
//! the `payload` part. This module turns that JSON into a [`PlaybackEvent`].
//!
//! # Parsing Strategy
//!
//! Only `event` is required. Server-level events carry no `Account` or
//! `Metadata`; those parse into an event with empty fields, which the filter
//! pipeline then discards like any other ineligible event. Unknown fields are
//! ignored.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{CrossReference, PlaybackEvent};

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a Plex webhook JSON document.
///
/// # Examples
///
/// ```
/// use plex_tvtime::webhooks::parse_webhook;
///
/// let payload = br#"{
///     "event": "media.scrobble",
///     "Account": { "title": "alice" },
///     "Metadata": {
///         "librarySectionType": "show",
///         "grandparentTitle": "Foo",
///         "parentIndex": 1,
///         "index": 2,
///         "title": "Pilot",
///         "Guid": [{ "id": "tvdb://456" }]
///     }
/// }"#;
///
/// let event = parse_webhook(payload).unwrap();
/// assert_eq!(event.show_title, "Foo");
/// ```
pub fn parse_webhook(payload: &[u8]) -> Result<PlaybackEvent, ParseError> {
    let raw: RawPayload = serde_json::from_slice(payload)?;

    let account = raw.account.map(|a| a.title).unwrap_or_default();
    let metadata = raw.metadata.unwrap_or_default();

    Ok(PlaybackEvent {
        account,
        library_section_type: metadata.library_section_type.unwrap_or_default(),
        show_title: metadata.grandparent_title.unwrap_or_default(),
        season: metadata.parent_index,
        episode: metadata.index,
        episode_title: metadata.title.unwrap_or_default(),
        action: raw.event,
        cross_references: metadata
            .guid
            .iter()
            .map(|g| CrossReference::from_guid(&g.id))
            .collect(),
    })
}

// ============================================================================
// Raw payload structures for deserialization
//
// These mirror Plex's JSON (PascalCase objects, camelCase fields).
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPayload {
    event: String,

    #[serde(rename = "Account")]
    account: Option<RawAccount>,

    #[serde(rename = "Metadata")]
    metadata: Option<RawMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetadata {
    library_section_type: Option<String>,
    grandparent_title: Option<String>,
    parent_index: Option<u32>,
    index: Option<u32>,
    title: Option<String>,

    #[serde(rename = "Guid", default)]
    guid: Vec<RawGuid>,
}

#[derive(Debug, Deserialize)]
struct RawGuid {
    id: String,
}
