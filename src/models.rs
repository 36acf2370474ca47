//! Core entities owned by (or read by) the control plane.
//!
//! `Server` placement fields are mutated only by the transition engine during
//! a successful transfer. `Node` and `Allocation` rows are read-only here
//! apart from the allocation ledger's owner column.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hosted server instance under management
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub uuid: Uuid,
    /// Primary network allocation currently bound to this server
    pub allocation_id: i64,
    /// Node the server currently lives on
    pub node_id: i64,
}

/// An execution host running a remote daemon agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub node_id: i64,
    pub name: String,
    /// "http" or "https"
    pub scheme: String,
    pub fqdn: String,
    pub daemon_port: u16,
}

impl Node {
    /// Base URL for the daemon agent on this node
    pub fn connection_address(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.fqdn, self.daemon_port)
    }
}

/// A network address/port binding, owned by at most one server at a time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub allocation_id: i64,
    pub server_uuid: Option<Uuid>,
}
