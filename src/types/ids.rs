//! Newtype wrappers for identifiers.
//!
//! These keep the tracking-service episode identifier distinct from the other
//! strings flowing through the pipeline (account names, titles, raw guids).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A TV Time (TheTVDB) episode identifier, with any `tvdb://` scheme stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub String);

impl EpisodeId {
    pub fn new(s: impl Into<String>) -> Self {
        EpisodeId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EpisodeId {
    fn from(s: String) -> Self {
        EpisodeId(s)
    }
}

impl From<&str> for EpisodeId {
    fn from(s: &str) -> Self {
        EpisodeId(s.to_string())
    }
}
