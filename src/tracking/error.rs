//! TV Time client error types.
//!
//! Every failure from the tracking service is categorized up front, because
//! the delivery loop reacts to each category differently:
//!
//! - **Authentication**: credentials are invalid. No event can make progress,
//!   so the whole process shuts down.
//! - **Transient**: the service answered but failed in a recoverable way.
//!   Retried with linear backoff and a fresh login, within the attempt budget.
//! - **NetworkUnreachable**: the service could not be reached at all. Retried
//!   after a long fixed wait without spending the attempt budget.
//! - **Other**: anything else. The current event is abandoned.

use std::fmt;
use thiserror::Error;

/// The kind of tracking-service error, categorized for retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingErrorKind {
    /// Credentials rejected (login 401/403, or 403 on a watch request).
    Authentication,

    /// Recoverable service failure (429, 5xx, expired session).
    Transient,

    /// Connection refused, DNS failure, timeout.
    NetworkUnreachable,

    /// Unclassified failure.
    Other,
}

impl TrackingErrorKind {
    /// Returns true if this error ends the process rather than one event.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackingErrorKind::Authentication)
    }
}

impl fmt::Display for TrackingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackingErrorKind::Authentication => "authentication",
            TrackingErrorKind::Transient => "transient",
            TrackingErrorKind::NetworkUnreachable => "network unreachable",
            TrackingErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// A tracking-service error with categorization for retry decisions.
#[derive(Debug, Error)]
pub struct TrackingError {
    pub kind: TrackingErrorKind,

    /// The HTTP status code, if the service answered.
    pub status_code: Option<u16>,

    pub message: String,

    /// The underlying HTTP client error, if any.
    #[source]
    pub source: Option<reqwest::Error>,
}

impl fmt::Display for TrackingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "TV Time error (HTTP {}): {}", code, self.message),
            None => write!(f, "TV Time error: {}", self.message),
        }
    }
}

impl TrackingError {
    fn without_source(kind: TrackingErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::without_source(TrackingErrorKind::Authentication, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::without_source(TrackingErrorKind::Transient, message)
    }

    pub fn network_unreachable(message: impl Into<String>) -> Self {
        Self::without_source(TrackingErrorKind::NetworkUnreachable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::without_source(TrackingErrorKind::Other, message)
    }

    /// Builds an error from a non-success HTTP status.
    pub fn from_status(kind: TrackingErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status_code: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes a transport-level reqwest error.
    ///
    /// Connect and timeout failures mean the service is unreachable; anything
    /// else (body decoding, redirect loops, builder errors) is unclassified.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_connect() || err.is_timeout() {
            TrackingErrorKind::NetworkUnreachable
        } else {
            TrackingErrorKind::Other
        };

        Self {
            kind,
            status_code: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Which client operation produced a status, since the same code means
/// different things for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    RecordWatched,
}

/// Maps a non-success HTTP status to an error kind.
///
/// A 401 on a watch request means the session expired, which a fresh login
/// fixes, so it is transient. A 401 or 403 on login means the credentials
/// themselves are bad.
pub fn classify_status(operation: Operation, status: u16) -> TrackingErrorKind {
    match (operation, status) {
        (Operation::Login, 401 | 403) => TrackingErrorKind::Authentication,
        (Operation::RecordWatched, 401) => TrackingErrorKind::Transient,
        (Operation::RecordWatched, 403) => TrackingErrorKind::Authentication,
        (_, 408 | 429) => TrackingErrorKind::Transient,
        (_, code) if (500..600).contains(&code) => TrackingErrorKind::Transient,
        _ => TrackingErrorKind::Other,
    }
}
