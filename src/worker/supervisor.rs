//! Worker lifecycle and escalation to process shutdown.
//!
//! The supervisor spawns the worker as a tokio task and watches how it ends.
//! An authentication failure or a panic cancels the shared shutdown token so
//! the HTTP server stops too; `main` then turns the [`ExitReason`] into the
//! process exit code.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::filter::FilterConfig;
use crate::tracking::{DeliveryPolicy, TrackingClient};

use super::queue::{EventSender, event_queue};
use super::worker::{ScrobbleWorker, WorkerExit};

/// How the supervised worker ended, from the process's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Shutdown was requested externally.
    Interrupted,

    /// The queue closed normally.
    Completed,

    /// The worker hit an unrecoverable failure.
    Fatal,
}

impl ExitReason {
    /// Conventional exit code for this reason (130 is SIGINT's).
    pub fn exit_code(self) -> i32 {
        match self {
            ExitReason::Completed => 0,
            ExitReason::Fatal => 1,
            ExitReason::Interrupted => 130,
        }
    }
}

/// Handle to the running worker task.
pub struct SupervisorHandle {
    task: JoinHandle<WorkerExit>,
    shutdown: CancellationToken,
}

/// Creates the queue and spawns the worker, returning the producer half.
pub fn spawn_worker<C>(
    filter: Arc<FilterConfig>,
    client: Arc<C>,
    policy: DeliveryPolicy,
    shutdown: CancellationToken,
) -> (EventSender, SupervisorHandle)
where
    C: TrackingClient + 'static,
{
    let (sender, receiver) = event_queue();
    let worker = ScrobbleWorker::new(filter, client, policy, receiver);
    let task = tokio::spawn(worker.run(shutdown.clone()));

    (sender, SupervisorHandle { task, shutdown })
}

impl SupervisorHandle {
    /// Waits for the worker to end and escalates fatal exits.
    pub async fn wait(self) -> ExitReason {
        let reason = match self.task.await {
            Ok(WorkerExit::Interrupted) => ExitReason::Interrupted,
            Ok(WorkerExit::QueueClosed) => ExitReason::Completed,
            Ok(WorkerExit::AuthenticationFailed(e)) => {
                error!(error = %e, "Unable to authenticate with TV Time, shutting down");
                ExitReason::Fatal
            }
            Err(e) => {
                error!(error = %e, "Worker task failed, shutting down");
                ExitReason::Fatal
            }
        };

        if reason == ExitReason::Fatal {
            self.shutdown.cancel();
        }
        info!(?reason, "Worker stopped");
        reason
    }
}
