//! Show identity used for include/exclude filtering.

use serde::Serialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Escape sequence standing in for a literal comma inside a comma-separated
/// show list (so `Foo%2C Bar` names the single show "Foo, Bar").
pub const ESCAPED_COMMA: &str = "%2C";

/// A show, identified by its title.
///
/// Equality and hashing ignore surrounding whitespace and ASCII/Unicode case,
/// so `"The Office"` and `" the office "` are the same show. The
/// trimmed title is kept as given for display and serialization.
#[derive(Debug, Clone, Serialize)]
pub struct Show {
    title: String,

    #[serde(skip)]
    key: String,
}

impl Show {
    /// Creates a show from a title as it appears in a webhook.
    pub fn new(title: impl AsRef<str>) -> Self {
        let title = title.as_ref().trim().to_string();
        let key = title.to_lowercase();
        Show { title, key }
    }

    /// Creates a show from one entry of a configured show list, restoring
    /// escaped commas before trimming.
    pub fn from_config_entry(entry: &str) -> Self {
        Show::new(entry.replace(ESCAPED_COMMA, ","))
    }

    /// Returns the trimmed title.
    pub fn title(&self) -> &str {
        &self.title
    }
}

impl PartialEq for Show {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Show {}

impl Hash for Show {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
