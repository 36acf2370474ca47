//! roost - Server Transfer Control Plane
//!
//! Coordinates the migration of a running server instance between execution
//! nodes. The data movement itself is performed by the remote daemon agents;
//! this crate owns the authoritative state transition that happens once a
//! daemon reports the outcome.
//!
//! # Modules
//!
//! - [`models`] - Server, Node and Allocation entities
//! - [`transfer`] - Transfer records, transition engine, webhook handlers
//! - [`daemon`] - Outbound HTTP client for node daemon agents
//! - [`gateway`] - Router wiring and shared application state
//! - [`db`] - PostgreSQL connection pool management
//! - [`config`] / [`logging`] - YAML config and tracing setup

pub mod config;
pub mod db;
pub mod logging;
pub mod models;

pub mod daemon;
pub mod gateway;
pub mod transfer;

// Convenient re-exports at crate root
pub use daemon::{DaemonApi, DaemonClient, DaemonError};
pub use models::{Allocation, Node, Server};
pub use transfer::{TransferError, TransferOutcome, TransferRecord, TransitionEngine};
