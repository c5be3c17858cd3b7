//! The single serial worker behind the webhook endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐  enqueue   ┌───────────────┐  next   ┌──────────────────────┐
//! │    axum     │ ─────────► │  event queue  │ ──────► │ worker               │
//! │  (accepts)  │            │  (unbounded)  │         │ filter → id → deliver│
//! └─────────────┘            └───────────────┘         └──────────────────────┘
//!       │ returns 202 Accepted                                   │
//!       ▼                                           supervisor: fatal exit
//!                                                   cancels the shutdown token
//! ```
//!
//! # Module Structure
//!
//! - [`queue`]: the unbounded FIFO and its producer/consumer halves
//! - [`worker`]: the event loop
//! - [`supervisor`]: spawning and exit escalation

pub mod queue;
pub mod supervisor;
#[allow(clippy::module_inception)]
pub mod worker;


pub use queue::{EnqueueError, EventReceiver, EventSender, event_queue};
pub use supervisor::{ExitReason, SupervisorHandle, spawn_worker};
pub use worker::{EventDisposition, ScrobbleWorker, WorkerExit};
