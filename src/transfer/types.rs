//! Transfer record types
//!
//! A `TransferRecord` is created during transfer initiation (upstream of this
//! crate) with the destination allocations already reserved, and is resolved
//! exactly once by the transition engine. Resolved rows are kept as an audit
//! trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal outcome of a transfer, stored as a nullable boolean.
///
/// Pending -> Successful XOR Pending -> Failed, never reversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferOutcome {
    Pending,
    Successful,
    Failed,
}

impl TransferOutcome {
    /// Database column value (`successful BOOLEAN NULL`)
    pub fn as_column(self) -> Option<bool> {
        match self {
            TransferOutcome::Pending => None,
            TransferOutcome::Successful => Some(true),
            TransferOutcome::Failed => Some(false),
        }
    }

    pub fn from_column(value: Option<bool>) -> Self {
        match value {
            None => TransferOutcome::Pending,
            Some(true) => TransferOutcome::Successful,
            Some(false) => TransferOutcome::Failed,
        }
    }

    pub fn is_pending(self) -> bool {
        self == TransferOutcome::Pending
    }
}

/// One migration attempt for a server between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRecord {
    pub transfer_id: i64,
    pub server_uuid: Uuid,
    pub old_allocation: i64,
    pub old_additional: Vec<i64>,
    pub new_allocation: i64,
    pub new_additional: Vec<i64>,
    pub old_node: i64,
    pub new_node: i64,
    pub outcome: TransferOutcome,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferRecord {
    /// Allocation set held on the source node (primary + additional).
    /// Released when the transfer succeeds.
    pub fn old_allocation_set(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(1 + self.old_additional.len());
        ids.push(self.old_allocation);
        ids.extend_from_slice(&self.old_additional);
        ids
    }

    /// Allocation set reserved on the destination node (primary + additional).
    /// Released when the transfer fails.
    pub fn new_allocation_set(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(1 + self.new_additional.len());
        ids.push(self.new_allocation);
        ids.extend_from_slice(&self.new_additional);
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TransferRecord {
        TransferRecord {
            transfer_id: 1,
            server_uuid: Uuid::new_v4(),
            old_allocation: 1,
            old_additional: vec![2, 3],
            new_allocation: 10,
            new_additional: vec![11],
            old_node: 100,
            new_node: 200,
            outcome: TransferOutcome::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_outcome_column_round_trip() {
        assert_eq!(TransferOutcome::Pending.as_column(), None);
        assert_eq!(TransferOutcome::Successful.as_column(), Some(true));
        assert_eq!(TransferOutcome::Failed.as_column(), Some(false));

        assert_eq!(TransferOutcome::from_column(None), TransferOutcome::Pending);
        assert!(TransferOutcome::from_column(None).is_pending());
        assert!(!TransferOutcome::from_column(Some(true)).is_pending());
    }

    #[test]
    fn test_old_allocation_set_includes_primary() {
        assert_eq!(record().old_allocation_set(), vec![1, 2, 3]);
    }

    #[test]
    fn test_new_allocation_set_includes_primary() {
        assert_eq!(record().new_allocation_set(), vec![10, 11]);
    }

    #[test]
    fn test_allocation_sets_with_no_additional() {
        let mut r = record();
        r.old_additional.clear();
        r.new_additional.clear();
        assert_eq!(r.old_allocation_set(), vec![1]);
        assert_eq!(r.new_allocation_set(), vec![10]);
    }
}
