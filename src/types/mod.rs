//! Core domain types for the scrobble relay.

pub mod event;
pub mod ids;
pub mod show;

pub use event::{CrossReference, EpisodeLabel, PlaybackEvent, SCROBBLE_ACTION, SHOW_LIBRARY};
pub use ids::EpisodeId;
pub use show::Show;
