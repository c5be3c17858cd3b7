//! Playback notification events.
//!
//! A [`PlaybackEvent`] is the validated form of one Plex webhook delivery. It is
//! built by the webhook parser, enqueued once, consumed once by the worker and
//! then dropped.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Show;

/// The only event action that marks an episode as watched.
pub const SCROBBLE_ACTION: &str = "media.scrobble";

/// The only library section type eligible for tracking.
pub const SHOW_LIBRARY: &str = "show";

/// A cross-reference identifier locating the item in an external catalog.
///
/// For a Plex guid such as `tvdb://456`, the namespace is `tvdb` and the value
/// is the full guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub namespace: String,
    pub value: String,
}

impl CrossReference {
    pub fn new(namespace: impl Into<String>, value: impl Into<String>) -> Self {
        CrossReference {
            namespace: namespace.into(),
            value: value.into(),
        }
    }

    /// Builds a cross-reference from a Plex guid (`scheme://rest`).
    ///
    /// A guid without a scheme separator uses the whole guid as its namespace.
    pub fn from_guid(guid: &str) -> Self {
        let namespace = guid.split_once("://").map_or(guid, |(scheme, _)| scheme);
        CrossReference::new(namespace, guid)
    }
}

/// One playback notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    /// Plex account that triggered the event.
    pub account: String,

    /// Library section type (`show`, `movie`, `artist`, ...).
    pub library_section_type: String,

    /// Show title (Plex `grandparentTitle`). Empty for non-episode items.
    pub show_title: String,

    /// Season number (Plex `parentIndex`).
    pub season: Option<u32>,

    /// Episode number within the season (Plex `index`).
    pub episode: Option<u32>,

    /// Episode title.
    pub episode_title: String,

    /// Event action (`media.play`, `media.scrobble`, ...).
    pub action: String,

    /// Cross-reference identifiers, in payload order.
    pub cross_references: Vec<CrossReference>,
}

impl PlaybackEvent {
    /// Returns the show this event belongs to.
    pub fn show(&self) -> Show {
        Show::new(&self.show_title)
    }

    /// Returns a display handle for log lines (`Show S1E2 - Title`).
    pub fn describe(&self) -> EpisodeLabel<'_> {
        EpisodeLabel(self)
    }
}

/// Human-readable episode label used in log lines.
pub struct EpisodeLabel<'a>(&'a PlaybackEvent);

impl fmt::Display for EpisodeLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = self.0;
        write!(f, "{} S", event.show_title)?;
        match event.season {
            Some(season) => write!(f, "{}", season)?,
            None => write!(f, "?")?,
        }
        write!(f, "E")?;
        match event.episode {
            Some(episode) => write!(f, "{}", episode)?,
            None => write!(f, "?")?,
        }
        write!(f, " - {}", event.episode_title)
    }
}
