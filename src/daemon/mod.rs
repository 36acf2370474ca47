//! Outbound HTTP client for node daemon agents.
//!
//! The daemon agent on each node exposes the transfer-push and server-delete
//! endpoints consumed here. All transport failures collapse into
//! [`DaemonError::Connection`] so callers never see reqwest types.

pub mod client;

/// Mock daemon for testing
#[cfg(test)]
pub mod mock;

pub use client::{DaemonApi, DaemonClient, DaemonError};
#[cfg(test)]
pub use mock::MockDaemon;
