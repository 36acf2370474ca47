//! Server Transfer Core
//!
//! Coordinates the control-plane side of moving a server between nodes.
//! The flow, as seen from this crate:
//!
//! ```text
//! Daemon callback → Webhook endpoint → Transition engine
//!                        → [transfer record + allocation ledger] (one tx)
//!                        → old-node cleanup (post-commit, best-effort)
//! ```
//!
//! # Safety invariants
//!
//! 1. **Write-once outcome**: pending → successful XOR pending → failed,
//!    enforced by a CAS update plus a partial unique index on the active row
//! 2. **Allocation exclusivity**: an allocation is owned by at most one
//!    server; release and rebind happen in the same transaction as resolve
//! 3. **Commit-before-cleanup**: the old-node delete runs only after the
//!    transaction commits, and its failure never surfaces to the caller

pub mod api;
pub mod engine;
pub mod error;
pub mod store;
pub mod types;

#[cfg(test)]
mod integration_tests;

// Re-exports for convenience
pub use engine::TransitionEngine;
pub use error::TransferError;
pub use store::TransferStore;
pub use types::{TransferOutcome, TransferRecord};
