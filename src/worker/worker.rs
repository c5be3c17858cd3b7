//! The serial event loop.
//!
//! One worker drains the queue for the lifetime of the process. Each event is
//! filtered, its TheTVDB id extracted, and the delivery loop run to a terminal
//! outcome before the next event is taken. Retry waits therefore block the
//! whole queue.
//!
//! The loop only ends in three ways:
//! - the shutdown token fires (while idle or mid-delivery)
//! - every producer is gone and the queue is drained
//! - TV Time rejects the credentials, which no later event can recover from

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::filter::{self, FilterConfig};
use crate::tracking::{
    DeliveryError, DeliveryOutcome, DeliveryPolicy, TrackingClient, TrackingError, deliver,
};
use crate::types::PlaybackEvent;
use crate::webhooks::extract_episode_id;

use super::queue::EventReceiver;

/// Why the worker loop returned.
#[derive(Debug)]
pub enum WorkerExit {
    /// Shutdown was requested.
    Interrupted,

    /// All senders were dropped and the queue is empty.
    QueueClosed,

    /// TV Time rejected the credentials.
    AuthenticationFailed(TrackingError),
}

/// What happened to a single event.
#[derive(Debug, PartialEq, Eq)]
pub enum EventDisposition {
    /// Discarded by the filter pipeline.
    Rejected,

    /// Passed the filter but carried no TheTVDB id.
    NoEpisodeId,

    /// Ran through delivery.
    Completed(DeliveryOutcome),
}

/// The single consumer of the event queue.
pub struct ScrobbleWorker<C> {
    filter: Arc<FilterConfig>,
    client: Arc<C>,
    policy: DeliveryPolicy,
    queue: EventReceiver,
}

impl<C: TrackingClient> ScrobbleWorker<C> {
    pub fn new(
        filter: Arc<FilterConfig>,
        client: Arc<C>,
        policy: DeliveryPolicy,
        queue: EventReceiver,
    ) -> Self {
        ScrobbleWorker {
            filter,
            client,
            policy,
            queue,
        }
    }

    /// Takes events until shutdown, queue closure or a fatal failure.
    #[instrument(skip_all, name = "queue-exec")]
    pub async fn run(mut self, shutdown: CancellationToken) -> WorkerExit {
        info!(max_attempts = self.policy.max_attempts, "Worker started");

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Worker interrupted while waiting for events");
                    return WorkerExit::Interrupted;
                }
                event = self.queue.next() => event,
            };

            let Some(event) = event else {
                info!("Event queue closed, worker stopping");
                return WorkerExit::QueueClosed;
            };

            match self.process(&event, &shutdown).await {
                Ok(_) => {}
                Err(DeliveryError::Interrupted) => {
                    info!(event = %event.describe(), "Worker interrupted during delivery");
                    return WorkerExit::Interrupted;
                }
                Err(DeliveryError::Authentication(e)) => {
                    error!(
                        error = %e,
                        pending = self.queue.len(),
                        "Stopping worker, TV Time credentials were rejected"
                    );
                    return WorkerExit::AuthenticationFailed(e);
                }
            }
        }
    }

    /// Runs one event to completion.
    ///
    /// Only the two process-level escalations come back as errors; every
    /// other outcome is logged here.
    pub async fn process(
        &self,
        event: &PlaybackEvent,
        shutdown: &CancellationToken,
    ) -> Result<EventDisposition, DeliveryError> {
        if !filter::accept(event, &self.filter) {
            return Ok(EventDisposition::Rejected);
        }

        let Some(episode) = extract_episode_id(event) else {
            debug!(event = %event.describe(), "No TheTVDB id on event, skipping");
            return Ok(EventDisposition::NoEpisodeId);
        };

        info!(
            show = %event.show_title,
            season = ?event.season,
            episode = ?event.episode,
            tvdb_id = %episode,
            "Processing webhook for {}",
            event.describe()
        );

        let outcome = deliver(self.client.as_ref(), &episode, &self.policy, shutdown).await?;
        match &outcome {
            DeliveryOutcome::Delivered { attempt, .. } => {
                info!(attempt, "Marked {} as watched on TV Time", event.describe());
            }
            DeliveryOutcome::Failed { attempts, reason } => {
                error!(
                    attempts,
                    reason = ?reason,
                    "Failed to process webhook for {}",
                    event.describe()
                );
            }
        }

        Ok(EventDisposition::Completed(outcome))
    }
}
