//! Daemon HTTP client

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Node;

/// Daemon call failure
#[derive(Error, Debug)]
pub enum DaemonError {
    /// Any transport-level failure talking to a node's daemon (connect,
    /// timeout, TLS, non-2xx response). Carries the original cause.
    #[error("Failed to connect to node daemon: {0}")]
    Connection(#[from] reqwest::Error),
}

/// Operations the control plane invokes on a node's daemon agent.
///
/// Trait seam so the transition engine can be exercised against a mock
/// daemon in tests.
#[async_trait]
pub trait DaemonApi: Send + Sync {
    /// Ask the daemon on `node` to start pulling the server archive.
    /// Used during transfer initiation. A failure here must abort the
    /// triggering operation.
    async fn notify_transfer_push(
        &self,
        node: &Node,
        server_uuid: Uuid,
        token: &str,
    ) -> Result<(), DaemonError>;

    /// Delete the server's local copy on an explicitly given node.
    ///
    /// The node is a parameter rather than derived from the server row:
    /// after a successful transfer the server's node field already points
    /// at the destination, and the delete must hit the old node.
    async fn delete_server(&self, node: &Node, server_uuid: Uuid) -> Result<(), DaemonError>;
}

/// Body of the daemon `POST /api/transfer` request
#[derive(Debug, Serialize)]
struct TransferPushRequest {
    server_id: String,
    /// Archive endpoint the daemon pulls the server data from
    url: String,
    /// "Bearer <jwt>" credential the daemon presents to the archive endpoint
    token: String,
    server: TransferPushServer,
}

#[derive(Debug, Serialize)]
struct TransferPushServer {
    uuid: String,
    start_on_completion: bool,
}

/// reqwest-backed implementation of [`DaemonApi`]
pub struct DaemonClient {
    http: reqwest::Client,
}

impl DaemonClient {
    /// Create a client with a bounded per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, DaemonError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

fn archive_url(node: &Node, server_uuid: Uuid) -> String {
    format!(
        "{}/api/servers/{}/archive",
        node.connection_address(),
        server_uuid
    )
}

fn server_url(node: &Node, server_uuid: Uuid) -> String {
    format!(
        "{}/api/servers/{}",
        node.connection_address(),
        server_uuid
    )
}

fn push_body(node: &Node, server_uuid: Uuid, token: &str) -> TransferPushRequest {
    TransferPushRequest {
        server_id: server_uuid.to_string(),
        url: archive_url(node, server_uuid),
        token: format!("Bearer {}", token),
        server: TransferPushServer {
            uuid: server_uuid.to_string(),
            start_on_completion: false,
        },
    }
}

#[async_trait]
impl DaemonApi for DaemonClient {
    async fn notify_transfer_push(
        &self,
        node: &Node,
        server_uuid: Uuid,
        token: &str,
    ) -> Result<(), DaemonError> {
        let url = format!("{}/api/transfer", node.connection_address());

        self.http
            .post(&url)
            .json(&push_body(node, server_uuid, token))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn delete_server(&self, node: &Node, server_uuid: Uuid) -> Result<(), DaemonError> {
        self.http
            .delete(server_url(node, server_uuid))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node() -> Node {
        Node {
            node_id: 3,
            name: "node-us-3".to_string(),
            scheme: "https".to_string(),
            fqdn: "n3.example.com".to_string(),
            daemon_port: 8443,
        }
    }

    #[test]
    fn test_archive_url() {
        let uuid: Uuid = "c0ffee00-0000-4000-8000-000000000001".parse().unwrap();
        assert_eq!(
            archive_url(&node(), uuid),
            "https://n3.example.com:8443/api/servers/c0ffee00-0000-4000-8000-000000000001/archive"
        );
    }

    #[test]
    fn test_server_url() {
        let uuid: Uuid = "c0ffee00-0000-4000-8000-000000000001".parse().unwrap();
        assert_eq!(
            server_url(&node(), uuid),
            "https://n3.example.com:8443/api/servers/c0ffee00-0000-4000-8000-000000000001"
        );
    }

    #[test]
    fn test_push_body_shape() {
        let uuid = Uuid::new_v4();
        let body = push_body(&node(), uuid, "jwt-abc");
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["server_id"], uuid.to_string());
        assert_eq!(
            json["url"],
            format!("https://n3.example.com:8443/api/servers/{}/archive", uuid)
        );
        assert_eq!(json["token"], "Bearer jwt-abc");
        assert_eq!(json["server"]["uuid"], uuid.to_string());
        assert_eq!(json["server"]["start_on_completion"], false);
    }

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(DaemonClient::new(Duration::from_secs(5)).is_ok());
    }
}
