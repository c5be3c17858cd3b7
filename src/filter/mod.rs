//! Event filtering: which playback events are forwarded to TV Time.
//!
//! - [`config`]: the allowed-user and show include/exclude sets
//! - [`pipeline`]: the ordered eligibility checks

pub mod config;
pub mod pipeline;

pub use config::FilterConfig;
pub use pipeline::{Rejection, accept, evaluate};
