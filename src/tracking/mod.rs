//! TV Time integration.
//!
//! - [`client`]: the [`TrackingClient`] boundary and its HTTP implementation
//! - [`error`]: failure categories driving retry decisions
//! - [`delivery`]: the bounded-retry loop for one watched episode

pub mod client;
pub mod delivery;
pub mod error;

pub use client::{Credentials, HttpTrackingClient, TrackingClient};
pub use delivery::{
    DEFAULT_MAX_ATTEMPTS, DeliveryError, DeliveryOutcome, DeliveryPolicy, FailureReason, deliver,
};
pub use error::{Operation, TrackingError, TrackingErrorKind, classify_status};
