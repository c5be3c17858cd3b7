//! Plex webhook handling.
//!
//! - [`parser`]: Plex JSON payload → [`PlaybackEvent`](crate::types::PlaybackEvent)
//! - [`guid`]: TheTVDB episode id extraction

pub mod guid;
pub mod parser;

pub use guid::extract_episode_id;
pub use parser::{ParseError, parse_webhook};
