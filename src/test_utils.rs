//! Shared test utilities: event builders, proptest strategies and a scripted
//! tracking client.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;

use crate::tracking::{TrackingClient, TrackingError, TrackingErrorKind};
use crate::types::{CrossReference, EpisodeId, PlaybackEvent, SCROBBLE_ACTION, SHOW_LIBRARY};

/// An eligible scrobble of `show` S1E2 by `account`, carrying a TheTVDB guid.
pub fn scrobble_event(account: &str, show: &str) -> PlaybackEvent {
    PlaybackEvent {
        account: account.to_string(),
        library_section_type: SHOW_LIBRARY.to_string(),
        show_title: show.to_string(),
        season: Some(1),
        episode: Some(2),
        episode_title: "Pilot".to_string(),
        action: SCROBBLE_ACTION.to_string(),
        cross_references: vec![
            CrossReference::new("imdb", "tt123"),
            CrossReference::new("tvdb", "tvdb://456"),
        ],
    }
}

pub fn arb_account() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,15}".prop_map(String::from)
}

/// Show titles without commas or surrounding whitespace.
pub fn arb_show_title() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9 ]{0,20}[a-zA-Z0-9]".prop_map(String::from)
}

pub fn arb_library_type() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(SHOW_LIBRARY.to_string()),
        Just("movie".to_string()),
        Just("artist".to_string()),
        Just("photo".to_string()),
    ]
}

pub fn arb_action() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(SCROBBLE_ACTION.to_string()),
        Just("media.play".to_string()),
        Just("media.pause".to_string()),
        Just("media.resume".to_string()),
        Just("media.stop".to_string()),
    ]
}

pub fn arb_cross_reference() -> impl Strategy<Value = CrossReference> {
    prop_oneof![
        "[0-9]{1,8}".prop_map(|id| CrossReference::from_guid(&format!("tvdb://{id}"))),
        "tt[0-9]{1,8}".prop_map(|id| CrossReference::from_guid(&format!("imdb://{id}"))),
        "[0-9]{1,8}".prop_map(|id| CrossReference::from_guid(&format!("tmdb://{id}"))),
    ]
}

pub fn arb_playback_event() -> impl Strategy<Value = PlaybackEvent> {
    (
        arb_account(),
        arb_library_type(),
        arb_show_title(),
        proptest::option::of(0u32..30),
        proptest::option::of(1u32..50),
        "[a-zA-Z ]{0,20}",
        arb_action(),
        prop::collection::vec(arb_cross_reference(), 0..4),
    )
        .prop_map(
            |(account, library, show, season, episode, title, action, xrefs)| PlaybackEvent {
                account,
                library_section_type: library,
                show_title: show,
                season,
                episode,
                episode_title: title,
                action,
                cross_references: xrefs,
            },
        )
}

/// One scripted response to `record_watched`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ok(&'static str),
    Fail(TrackingErrorKind),
}

impl Step {
    fn into_result(self) -> Result<String, TrackingError> {
        match self {
            Step::Ok(confirmation) => Ok(confirmation.to_string()),
            Step::Fail(kind) => Err(failure(kind, "scripted failure")),
        }
    }
}

fn failure(kind: TrackingErrorKind, message: &str) -> TrackingError {
    match kind {
        TrackingErrorKind::Authentication => TrackingError::authentication(message),
        TrackingErrorKind::Transient => TrackingError::transient(message),
        TrackingErrorKind::NetworkUnreachable => TrackingError::network_unreachable(message),
        TrackingErrorKind::Other => TrackingError::other(message),
    }
}

/// A tracking client that replays a fixed script and records every call.
///
/// Once the script is exhausted, `record_watched` answers with the fallback
/// step (an `Other` failure unless built with [`ScriptedClient::succeeding`]).
#[derive(Debug)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Step>>,
    fallback: Step,
    login_failure: Option<TrackingErrorKind>,
    watched: Mutex<Vec<EpisodeId>>,
    logins: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(script: Vec<Step>) -> Self {
        ScriptedClient {
            script: Mutex::new(script.into()),
            fallback: Step::Fail(TrackingErrorKind::Other),
            login_failure: None,
            watched: Mutex::new(Vec::new()),
            logins: AtomicUsize::new(0),
        }
    }

    /// A client that accepts every request.
    pub fn succeeding() -> Self {
        ScriptedClient {
            fallback: Step::Ok("ok"),
            ..Self::new(vec![])
        }
    }

    /// Makes every `login` call fail with `kind`.
    pub fn with_login_failure(mut self, kind: TrackingErrorKind) -> Self {
        self.login_failure = Some(kind);
        self
    }

    pub fn watched_calls(&self) -> Vec<EpisodeId> {
        self.watched.lock().unwrap().clone()
    }

    pub fn login_calls(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

impl TrackingClient for ScriptedClient {
    fn login(&self) -> impl Future<Output = Result<(), TrackingError>> + Send {
        self.logins.fetch_add(1, Ordering::SeqCst);
        let result = match self.login_failure {
            Some(kind) => Err(failure(kind, "scripted login failure")),
            None => Ok(()),
        };
        std::future::ready(result)
    }

    fn record_watched(
        &self,
        episode: &EpisodeId,
    ) -> impl Future<Output = Result<String, TrackingError>> + Send {
        self.watched.lock().unwrap().push(episode.clone());
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback);
        std::future::ready(step.into_result())
    }
}
