//! Transfer store: transfer record rows plus the allocation ledger.
//!
//! Pool-level reads live on [`TransferStore`]. Everything that mutates state
//! takes an open transaction's connection instead, so the transition engine
//! controls the transaction boundary: resolve + allocation mutations commit
//! together or not at all.

use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use crate::models::{Allocation, Node, Server};

use super::error::TransferError;
use super::types::{TransferOutcome, TransferRecord};

/// Pool-level lookups for the transition engine and webhook handlers
pub struct TransferStore {
    pool: PgPool,
}

impl TransferStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Look up a server by its UUID
    pub async fn get_server(&self, uuid: Uuid) -> Result<Option<Server>, TransferError> {
        let row = sqlx::query(
            "SELECT uuid, allocation_id, node_id FROM servers_tb WHERE uuid = $1",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| row_to_server(&r)))
    }

    /// Look up a node by id (read-only; used to address daemon calls)
    pub async fn get_node(&self, node_id: i64) -> Result<Option<Node>, TransferError> {
        let row = sqlx::query(
            "SELECT node_id, name, scheme, fqdn, daemon_port FROM nodes_tb WHERE node_id = $1",
        )
        .bind(node_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(Node {
                node_id: r.get("node_id"),
                name: r.get("name"),
                scheme: r.get("scheme"),
                fqdn: r.get("fqdn"),
                daemon_port: decode_daemon_port(r.get("daemon_port"))?,
            })),
            None => Ok(None),
        }
    }

    /// Look up an allocation and its current owner
    pub async fn get_allocation(
        &self,
        allocation_id: i64,
    ) -> Result<Option<Allocation>, TransferError> {
        let row = sqlx::query(
            "SELECT allocation_id, server_uuid FROM allocations_tb WHERE allocation_id = $1",
        )
        .bind(allocation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Allocation {
            allocation_id: r.get("allocation_id"),
            server_uuid: r.get("server_uuid"),
        }))
    }
}

// === In-transaction operations ===

/// Find the server's active (unresolved) transfer and lock its row.
///
/// The `FOR UPDATE` lock is the serialization point between concurrent
/// success/failure callbacks for the same server: the loser of the race
/// blocks here, then observes no pending row and returns `None`.
pub async fn find_active_transfer_for_update(
    conn: &mut PgConnection,
    server_uuid: Uuid,
) -> Result<Option<TransferRecord>, TransferError> {
    let row = sqlx::query(
        r#"
        SELECT transfer_id, server_uuid, old_allocation, new_allocation,
               old_additional, new_additional, old_node, new_node, successful,
               created_at, updated_at
        FROM server_transfers_tb
        WHERE server_uuid = $1 AND successful IS NULL
        FOR UPDATE
        "#,
    )
    .bind(server_uuid)
    .fetch_optional(conn)
    .await?;

    match row {
        Some(row) => Ok(Some(row_to_transfer(&row))),
        None => Ok(None),
    }
}

/// Write the terminal outcome of a transfer (true = successful,
/// false = failed).
///
/// CAS against `successful IS NULL`: zero rows affected means the record was
/// resolved by someone else, which is a hard error for the caller.
pub async fn resolve(
    conn: &mut PgConnection,
    transfer_id: i64,
    successful: bool,
) -> Result<(), TransferError> {
    let result = sqlx::query(
        r#"
        UPDATE server_transfers_tb
        SET successful = $1, updated_at = NOW()
        WHERE transfer_id = $2 AND successful IS NULL
        "#,
    )
    .bind(successful)
    .bind(transfer_id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(TransferError::AlreadyResolved(transfer_id));
    }

    Ok(())
}

/// Clear the owning-server reference for every allocation in the set.
///
/// Idempotent: releasing an already-free allocation is a no-op.
pub async fn release_allocations(
    conn: &mut PgConnection,
    allocation_ids: &[i64],
) -> Result<(), TransferError> {
    sqlx::query("UPDATE allocations_tb SET server_uuid = NULL WHERE allocation_id = ANY($1)")
        .bind(allocation_ids)
        .execute(conn)
        .await?;

    Ok(())
}

/// Point the server at its new primary allocation and node in one update
pub async fn rebind_server(
    conn: &mut PgConnection,
    server_uuid: Uuid,
    allocation_id: i64,
    node_id: i64,
) -> Result<(), TransferError> {
    sqlx::query("UPDATE servers_tb SET allocation_id = $1, node_id = $2 WHERE uuid = $3")
        .bind(allocation_id)
        .bind(node_id)
        .bind(server_uuid)
        .execute(conn)
        .await?;

    Ok(())
}

/// Re-read the server inside the transaction, after a rebind
pub async fn reload_server(
    conn: &mut PgConnection,
    server_uuid: Uuid,
) -> Result<Server, TransferError> {
    let row = sqlx::query("SELECT uuid, allocation_id, node_id FROM servers_tb WHERE uuid = $1")
        .bind(server_uuid)
        .fetch_one(conn)
        .await?;

    Ok(row_to_server(&row))
}

/// A port outside the u16 range means a corrupt node row; surface it as a
/// decode failure instead of truncating. The schema enforces the range with
/// a CHECK constraint as well.
fn decode_daemon_port(port: i32) -> Result<u16, TransferError> {
    u16::try_from(port).map_err(|e| {
        TransferError::Database(sqlx::Error::ColumnDecode {
            index: "daemon_port".to_string(),
            source: Box::new(e),
        })
    })
}

fn row_to_server(row: &PgRow) -> Server {
    Server {
        uuid: row.get("uuid"),
        allocation_id: row.get("allocation_id"),
        node_id: row.get("node_id"),
    }
}

fn row_to_transfer(row: &PgRow) -> TransferRecord {
    TransferRecord {
        transfer_id: row.get("transfer_id"),
        server_uuid: row.get("server_uuid"),
        old_allocation: row.get("old_allocation"),
        old_additional: row.get("old_additional"),
        new_allocation: row.get("new_allocation"),
        new_additional: row.get("new_additional"),
        old_node: row.get("old_node"),
        new_node: row.get("new_node"),
        outcome: TransferOutcome::from_column(row.get("successful")),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_daemon_port_in_range() {
        assert_eq!(decode_daemon_port(8443).unwrap(), 8443);
        assert_eq!(decode_daemon_port(65535).unwrap(), 65535);
    }

    #[test]
    fn test_decode_daemon_port_rejects_out_of_range() {
        assert!(matches!(
            decode_daemon_port(-1),
            Err(TransferError::Database(_))
        ));
        assert!(matches!(
            decode_daemon_port(70000),
            Err(TransferError::Database(_))
        ));
    }
}
