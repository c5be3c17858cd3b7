//! Filter configuration: who and what gets forwarded.
//!
//! Built once at startup from three comma-separated lists and read-only after
//! that, so it is shared between the worker and the HTTP surface behind an
//! `Arc` without locking.

use std::collections::HashSet;

use crate::types::Show;

/// Allowed accounts plus the excluded/included show sets.
///
/// When `excluded_shows` is non-empty it alone governs show filtering;
/// `included_shows` is consulted only when nothing is excluded. Both empty
/// means no show filtering at all.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Lower-cased account names.
    allowed_users: HashSet<String>,
    excluded_shows: HashSet<Show>,
    included_shows: HashSet<Show>,
}

impl FilterConfig {
    /// Builds the configuration from delimiter-separated lists.
    ///
    /// Entries are trimmed and blank entries dropped. Show entries have `%2C`
    /// restored to `,`. Nothing here can fail: malformed entries are kept as
    /// literal strings.
    pub fn initialize(user_list: &str, exclude_list: &str, include_list: &str) -> Self {
        let allowed_users = split_entries(user_list)
            .map(|user| user.to_lowercase())
            .collect();

        FilterConfig {
            allowed_users,
            excluded_shows: parse_show_list(exclude_list),
            included_shows: parse_show_list(include_list),
        }
    }

    /// Returns true if the account (compared case-insensitively) is allowed.
    pub fn is_allowed_user(&self, account: &str) -> bool {
        self.allowed_users.contains(&account.to_lowercase())
    }

    pub fn is_excluded(&self, show: &Show) -> bool {
        self.excluded_shows.contains(show)
    }

    pub fn is_included(&self, show: &Show) -> bool {
        self.included_shows.contains(show)
    }

    pub fn has_excluded_shows(&self) -> bool {
        !self.excluded_shows.is_empty()
    }

    pub fn has_included_shows(&self) -> bool {
        !self.included_shows.is_empty()
    }

    /// Snapshot of the excluded shows, sorted by title.
    pub fn excluded_shows(&self) -> Vec<Show> {
        sorted(&self.excluded_shows)
    }

    /// Snapshot of the included shows, sorted by title.
    pub fn included_shows(&self) -> Vec<Show> {
        sorted(&self.included_shows)
    }
}

fn split_entries(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|entry| !entry.is_empty())
}

fn parse_show_list(list: &str) -> HashSet<Show> {
    // Split before unescaping so an escaped comma never acts as a delimiter.
    list.split(',')
        .map(Show::from_config_entry)
        .filter(|show| !show.title().is_empty())
        .collect()
}

fn sorted(shows: &HashSet<Show>) -> Vec<Show> {
    let mut shows: Vec<Show> = shows.iter().cloned().collect();
    shows.sort_by(|a, b| a.title().cmp(b.title()));
    shows
}
