//! Plex → TV Time scrobble relay.
//!
//! Receives Plex playback webhooks, filters them by account and show, and marks
//! watched episodes on TV Time from a single serial worker with bounded
//! retries.

pub mod config;
pub mod filter;
pub mod server;
pub mod service;
pub mod shutdown;
pub mod tracking;
pub mod types;
pub mod webhooks;
pub mod worker;

#[cfg(test)]
mod test_utils;
