//! Bounded-retry delivery of one watched episode.
//!
//! # States
//!
//! ```text
//!            ┌──────────── NetworkUnreachable (wait, same attempt) ──┐
//!            ▼                                                       │
//!   Pending{attempt} ── record_watched ──┬── Ok ──────────────► Delivered
//!            ▲                           ├── Transient ── wait, login, wait ─┐
//!            │                           ├── Other ───────────► FailedFinal  │
//!            │                           └── Authentication ──► escalate     │
//!            └──────────── attempt + 1 (≤ max_attempts, else FailedFinal) ◄──┘
//! ```
//!
//! Only `NetworkUnreachable` is exempt from the attempt budget. Every wait
//! observes the shutdown token, so an interruption ends delivery immediately.

use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use super::client::TrackingClient;
use super::error::{TrackingError, TrackingErrorKind};
use crate::types::EpisodeId;

/// Default attempt budget per event.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default backoff unit; a transient failure on attempt `n` waits `n` units
/// before and again after re-login.
const DEFAULT_BACKOFF_UNIT_MS: u64 = 3_000;

/// Default wait after the service was unreachable.
const DEFAULT_NETWORK_RETRY_DELAY_SECS: u64 = 120;

/// Retry budget and timings for a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub max_attempts: u32,
    pub backoff_unit: Duration,
    pub network_retry_delay: Duration,
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl DeliveryPolicy {
    pub fn new() -> Self {
        DeliveryPolicy {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: Duration::from_millis(DEFAULT_BACKOFF_UNIT_MS),
            network_retry_delay: Duration::from_secs(DEFAULT_NETWORK_RETRY_DELAY_SECS),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Half of the total pause after a transient failure on `attempt`; the
    /// loop waits this long on each side of the re-login.
    pub fn transient_backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

/// Where a single delivery ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The service confirmed the episode as watched.
    Delivered {
        /// Attempt number on which the service accepted the request.
        attempt: u32,
        confirmation: String,
    },

    /// The event was abandoned; later events are unaffected.
    Failed {
        /// Attempts spent from the budget.
        attempts: u32,
        reason: FailureReason,
    },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Why a delivery was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Every attempt in the budget hit a transient failure.
    ExhaustedAttempts { last_error: String },

    /// An unclassified failure stopped retries immediately.
    Aborted { error: String },
}

/// Failures that escape the current event and stop the worker.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Credentials are invalid; no future event can succeed either.
    #[error("unable to authenticate with TV Time: {0}")]
    Authentication(#[source] TrackingError),

    /// Shutdown was requested while waiting.
    #[error("delivery interrupted by shutdown")]
    Interrupted,
}

/// Internal loop state.
enum State {
    Pending { attempt: u32 },
    Done(DeliveryOutcome),
}

/// Delivers one episode, retrying according to `policy`.
///
/// Returns `Ok` for both terminal outcomes (delivered or abandoned) and `Err`
/// only for the two escalations: an authentication failure or an interruption.
#[instrument(skip(client, episode, policy, shutdown), fields(episode = %episode))]
pub async fn deliver<C: TrackingClient>(
    client: &C,
    episode: &EpisodeId,
    policy: &DeliveryPolicy,
    shutdown: &CancellationToken,
) -> Result<DeliveryOutcome, DeliveryError> {
    let mut state = State::Pending { attempt: 1 };

    loop {
        let attempt = match state {
            State::Done(outcome) => return Ok(outcome),
            State::Pending { attempt } => attempt,
        };

        let result = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Err(DeliveryError::Interrupted),
            result = client.record_watched(episode) => result,
        };

        state = match result {
            Ok(confirmation) => {
                debug!(attempt, confirmation = %confirmation, "TV Time confirmed watch");
                State::Done(DeliveryOutcome::Delivered {
                    attempt,
                    confirmation,
                })
            }
            Err(e) => match e.kind {
                TrackingErrorKind::Authentication => {
                    error!(error = %e, "Unable to authenticate with TV Time, please check your credentials");
                    return Err(DeliveryError::Authentication(e));
                }
                TrackingErrorKind::Transient => {
                    let backoff = policy.transient_backoff(attempt);
                    warn!(
                        error = %e,
                        retry_in_secs = (backoff * 2).as_secs(),
                        attempts_remaining = policy.max_attempts.saturating_sub(attempt),
                        "Connection to TV Time failed, will retry"
                    );
                    match recover_session(client, backoff, shutdown).await? {
                        Some(abort) => State::Done(DeliveryOutcome::Failed {
                            attempts: attempt,
                            reason: FailureReason::Aborted {
                                error: abort.to_string(),
                            },
                        }),
                        None if attempt >= policy.max_attempts => {
                            State::Done(DeliveryOutcome::Failed {
                                attempts: attempt,
                                reason: FailureReason::ExhaustedAttempts {
                                    last_error: e.to_string(),
                                },
                            })
                        }
                        None => State::Pending {
                            attempt: attempt + 1,
                        },
                    }
                }
                TrackingErrorKind::NetworkUnreachable => {
                    error!(
                        error = %e,
                        retry_in_secs = policy.network_retry_delay.as_secs(),
                        "Unable to reach TV Time, please check your internet connection"
                    );
                    sleep_or_interrupt(policy.network_retry_delay, shutdown).await?;
                    // Re-enter Pending without spending the budget.
                    State::Pending { attempt }
                }
                TrackingErrorKind::Other => {
                    error!(error = %e, "TV Time request failed");
                    State::Done(DeliveryOutcome::Failed {
                        attempts: attempt,
                        reason: FailureReason::Aborted {
                            error: e.to_string(),
                        },
                    })
                }
            },
        };
    }
}

/// Waits, logs in again, and waits again.
///
/// Returns `Ok(Some(err))` when the login failed in a way that abandons the
/// current event, and escalates authentication failures.
async fn recover_session<C: TrackingClient>(
    client: &C,
    backoff: Duration,
    shutdown: &CancellationToken,
) -> Result<Option<TrackingError>, DeliveryError> {
    sleep_or_interrupt(backoff, shutdown).await?;

    let login = tokio::select! {
        biased;
        _ = shutdown.cancelled() => return Err(DeliveryError::Interrupted),
        login = client.login() => login,
    };

    if let Err(e) = login {
        if e.kind.is_fatal() {
            error!(error = %e, "Unable to authenticate with TV Time, please check your credentials");
            return Err(DeliveryError::Authentication(e));
        }
        warn!(error = %e, "Re-login to TV Time failed");
        return Ok(Some(e));
    }

    sleep_or_interrupt(backoff, shutdown).await?;
    Ok(None)
}

async fn sleep_or_interrupt(
    duration: Duration,
    shutdown: &CancellationToken,
) -> Result<(), DeliveryError> {
    tokio::select! {
        biased;
        _ = shutdown.cancelled() => Err(DeliveryError::Interrupted),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
