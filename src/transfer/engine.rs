//! Transition Engine
//!
//! Resolves an in-flight transfer exactly once, based on the outcome the
//! daemon reports back. The authoritative state transition (transfer outcome
//! + allocation ledger + server placement) runs inside a single database
//! transaction; the remote cleanup of the old node runs strictly after
//! commit and is best-effort.

use std::sync::Arc;

use uuid::Uuid;

use crate::daemon::DaemonApi;
use crate::models::Server;

use super::error::TransferError;
use super::store::{self, TransferStore};
use super::types::TransferRecord;

pub struct TransitionEngine {
    store: TransferStore,
    daemon: Arc<dyn DaemonApi>,
}

impl TransitionEngine {
    pub fn new(store: TransferStore, daemon: Arc<dyn DaemonApi>) -> Self {
        Self { store, daemon }
    }

    pub fn store(&self) -> &TransferStore {
        &self.store
    }

    /// The daemon reports a failed transfer.
    ///
    /// Marks the record failed and releases the allocation set reserved on
    /// the (aborted) destination. The server keeps living on the old node
    /// and old allocation, untouched.
    pub async fn report_failure(&self, server_uuid: Uuid) -> Result<(), TransferError> {
        let server = self
            .store
            .get_server(server_uuid)
            .await?
            .ok_or(TransferError::NotFound)?;

        let mut tx = self.store.pool().begin().await?;

        // Row lock doubles as the guard against a racing success callback
        let transfer = store::find_active_transfer_for_update(&mut tx, server.uuid)
            .await?
            .ok_or(TransferError::Conflict)?;

        store::resolve(&mut tx, transfer.transfer_id, false).await?;
        store::release_allocations(&mut tx, &transfer.new_allocation_set()).await?;

        tx.commit().await?;

        tracing::info!(
            transfer_id = transfer.transfer_id,
            server_uuid = %server.uuid,
            old_node = transfer.old_node,
            new_node = transfer.new_node,
            "Transfer failed; destination allocations released"
        );

        Ok(())
    }

    /// The daemon reports a successful transfer.
    ///
    /// In one transaction: release the old allocation set, rebind the server
    /// to the new allocation and node, and mark the record successful. Any
    /// failure inside the transaction rolls the whole transition back.
    /// After commit, best-effort delete of the stale copy on the old node.
    pub async fn report_success(&self, server_uuid: Uuid) -> Result<(), TransferError> {
        let server = self
            .store
            .get_server(server_uuid)
            .await?
            .ok_or(TransferError::NotFound)?;

        let mut tx = self.store.pool().begin().await?;

        let transfer = store::find_active_transfer_for_update(&mut tx, server.uuid)
            .await?
            .ok_or(TransferError::Conflict)?;

        store::release_allocations(&mut tx, &transfer.old_allocation_set()).await?;
        store::rebind_server(&mut tx, server.uuid, transfer.new_allocation, transfer.new_node)
            .await?;
        let server = store::reload_server(&mut tx, server.uuid).await?;
        store::resolve(&mut tx, transfer.transfer_id, true).await?;

        tx.commit().await?;

        tracing::info!(
            transfer_id = transfer.transfer_id,
            server_uuid = %server.uuid,
            old_node = transfer.old_node,
            new_node = server.node_id,
            "Transfer committed; server rebound to new node"
        );

        self.cleanup_old_node(&server, &transfer).await;

        Ok(())
    }

    /// Delete the stale server copy from the old node.
    ///
    /// The control-plane state is already committed; a connection failure
    /// here is an operator concern, not a correctness concern. Addressed to
    /// the transfer's old node explicitly, since the server row now points
    /// at the new node.
    async fn cleanup_old_node(&self, server: &Server, transfer: &TransferRecord) {
        let old_node = match self.store.get_node(transfer.old_node).await {
            Ok(Some(node)) => node,
            Ok(None) => {
                tracing::warn!(
                    transfer_id = transfer.transfer_id,
                    old_node = transfer.old_node,
                    "Old node no longer exists; skipping stale copy cleanup"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(
                    transfer_id = transfer.transfer_id,
                    error = %e,
                    "Failed to load old node; skipping stale copy cleanup"
                );
                return;
            }
        };

        if let Err(e) = self.daemon.delete_server(&old_node, server.uuid).await {
            tracing::warn!(
                transfer_id = transfer.transfer_id,
                server_uuid = %server.uuid,
                old_node = old_node.node_id,
                error = %e,
                "Failed to delete stale server copy from old node"
            );
        }
    }
}
