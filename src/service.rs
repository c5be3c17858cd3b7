//! The relay's entry point for producers.
//!
//! [`ScrobbleService`] hands parsed events to the worker queue and exposes the
//! configured show lists read-only. It is cheap to clone and shared by every
//! HTTP handler.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::filter::FilterConfig;
use crate::tracking::{DeliveryPolicy, TrackingClient};
use crate::types::{PlaybackEvent, Show};
use crate::worker::{EnqueueError, EventSender, SupervisorHandle, spawn_worker};

#[derive(Debug, Clone)]
pub struct ScrobbleService {
    filter: Arc<FilterConfig>,
    sender: EventSender,
}

impl ScrobbleService {
    /// Spawns the supervised worker and returns the service plus the
    /// worker's handle.
    pub fn start<C>(
        filter: FilterConfig,
        client: Arc<C>,
        policy: DeliveryPolicy,
        shutdown: CancellationToken,
    ) -> (Self, SupervisorHandle)
    where
        C: TrackingClient + 'static,
    {
        let filter = Arc::new(filter);
        let (sender, handle) = spawn_worker(filter.clone(), client, policy, shutdown);
        (ScrobbleService { filter, sender }, handle)
    }

    /// Builds a service over an existing queue, without a worker.
    pub fn from_parts(filter: Arc<FilterConfig>, sender: EventSender) -> Self {
        ScrobbleService { filter, sender }
    }

    /// Queues an event for the worker. Never waits on delivery.
    pub fn mark_as_watched(&self, event: PlaybackEvent) -> Result<(), EnqueueError> {
        let label = event.describe().to_string();
        match self.sender.enqueue(event) {
            Ok(()) => {
                debug!(event = %label, "Queued webhook");
                Ok(())
            }
            Err(e) => {
                warn!(event = %label, error = %e, "Dropping webhook");
                Err(e)
            }
        }
    }

    pub fn excluded_shows(&self) -> Vec<Show> {
        self.filter.excluded_shows()
    }

    pub fn included_shows(&self) -> Vec<Show> {
        self.filter.included_shows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{ScriptedClient, scrobble_event};
    use crate::types::EpisodeId;
    use crate::worker::{ExitReason, event_queue};

    #[test]
    fn show_snapshots_come_from_filter() {
        let (sender, _rx) = event_queue();
        let filter = Arc::new(FilterConfig::initialize("alice", "Zed, Alpha", "Mid"));
        let service = ScrobbleService::from_parts(filter, sender);

        let excluded: Vec<_> = service
            .excluded_shows()
            .iter()
            .map(|s| s.title().to_string())
            .collect();
        assert_eq!(excluded, vec!["Alpha", "Zed"]);
        assert_eq!(service.included_shows().len(), 1);
    }

    #[tokio::test]
    async fn mark_as_watched_enqueues_without_waiting() {
        let (sender, mut rx) = event_queue();
        let service =
            ScrobbleService::from_parts(Arc::new(FilterConfig::default()), sender);

        service.mark_as_watched(scrobble_event("alice", "Foo")).unwrap();

        assert_eq!(rx.next().await.unwrap().show_title, "Foo");
    }

    #[test]
    fn mark_as_watched_fails_once_worker_is_gone() {
        let (sender, rx) = event_queue();
        drop(rx);
        let service =
            ScrobbleService::from_parts(Arc::new(FilterConfig::default()), sender);

        assert_eq!(
            service.mark_as_watched(scrobble_event("alice", "Foo")),
            Err(EnqueueError::WorkerStopped)
        );
    }

    #[tokio::test]
    async fn started_service_delivers_events() {
        let client = Arc::new(ScriptedClient::succeeding());
        let (service, handle) = ScrobbleService::start(
            FilterConfig::initialize("alice", "", ""),
            client.clone(),
            DeliveryPolicy::default(),
            CancellationToken::new(),
        );

        service.mark_as_watched(scrobble_event("alice", "Foo")).unwrap();
        drop(service);

        assert_eq!(handle.wait().await, ExitReason::Completed);
        assert_eq!(client.watched_calls(), vec![EpisodeId::from("456")]);
    }
}
