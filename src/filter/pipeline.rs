//! Eligibility checks applied to every dequeued event.
//!
//! The checks run in a fixed order and stop at the first failure:
//!
//! 1. account is in the allowed user list
//! 2. library section type is `show`
//! 3. show passes the exclude (or, failing that, include) list
//! 4. action is `media.scrobble`
//!
//! A rejection is a normal discard, not an error.

use thiserror::Error;
use tracing::info;

use super::FilterConfig;
use crate::types::{PlaybackEvent, SCROBBLE_ACTION, SHOW_LIBRARY};

/// Why an event was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Ignoring webhook for plex user '{0}', only the configured users will be processed")]
    UserNotAllowed(String),

    #[error("Ignoring webhook for library type '{0}', only type 'show' will be processed")]
    NotAShow(String),

    #[error("Ignoring webhook for show '{0}', it is in the excluded list")]
    ShowExcluded(String),

    #[error("Ignoring webhook for show '{0}', it is not in the included list")]
    ShowNotIncluded(String),

    #[error("Ignoring webhook for event type '{0}', only type media.scrobble will be processed")]
    NotAScrobble(String),
}

/// Runs every check and reports the first failing one.
pub fn evaluate(event: &PlaybackEvent, config: &FilterConfig) -> Result<(), Rejection> {
    if !config.is_allowed_user(&event.account) {
        return Err(Rejection::UserNotAllowed(event.account.clone()));
    }

    if event.library_section_type != SHOW_LIBRARY {
        return Err(Rejection::NotAShow(event.library_section_type.clone()));
    }

    let show = event.show();
    if config.has_excluded_shows() {
        if config.is_excluded(&show) {
            return Err(Rejection::ShowExcluded(event.show_title.clone()));
        }
    } else if config.has_included_shows() && !config.is_included(&show) {
        return Err(Rejection::ShowNotIncluded(event.show_title.clone()));
    }

    if event.action != SCROBBLE_ACTION {
        return Err(Rejection::NotAScrobble(event.action.clone()));
    }

    Ok(())
}

/// Returns true if the event should be forwarded, logging the reason otherwise.
pub fn accept(event: &PlaybackEvent, config: &FilterConfig) -> bool {
    match evaluate(event, config) {
        Ok(()) => true,
        Err(rejection) => {
            info!("{}", rejection);
            false
        }
    }
}
