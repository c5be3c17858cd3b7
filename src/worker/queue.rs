//! Unbounded FIFO between webhook producers and the single worker.
//!
//! Producers hold cloneable [`EventSender`]s and never block. The worker owns
//! the one [`EventReceiver`], which suspends on an empty queue.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::types::PlaybackEvent;

/// Errors returned to producers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnqueueError {
    /// The worker has exited and will never take another event.
    #[error("worker stopped, event not queued")]
    WorkerStopped,
}

/// Creates a connected sender/receiver pair.
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventReceiver { rx })
}

/// Producer half of the queue.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl EventSender {
    /// Appends an event without waiting.
    pub fn enqueue(&self, event: PlaybackEvent) -> Result<(), EnqueueError> {
        self.tx.send(event).map_err(|_| EnqueueError::WorkerStopped)
    }

    /// Returns true once the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half of the queue.
#[derive(Debug)]
pub struct EventReceiver {
    rx: mpsc::UnboundedReceiver<PlaybackEvent>,
}

impl EventReceiver {
    /// Waits for the next event. Returns `None` once every sender is gone
    /// and the queue is drained.
    pub async fn next(&mut self) -> Option<PlaybackEvent> {
        self.rx.recv().await
    }

    /// Number of events waiting.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
