//! Mock daemon for exercising the transition engine without a network

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::Node;

use super::client::{DaemonApi, DaemonError};

/// In-memory [`DaemonApi`] with call counters and failure injection
#[derive(Default)]
pub struct MockDaemon {
    notify_count: AtomicUsize,
    delete_count: AtomicUsize,
    fail_delete: AtomicBool,
    /// Node ids the delete calls were addressed to, in order
    delete_targets: Mutex<Vec<i64>>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent delete_server calls fail with a connection error
    pub fn set_fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn notify_count(&self) -> usize {
        self.notify_count.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_count.load(Ordering::SeqCst)
    }

    pub fn delete_targets(&self) -> Vec<i64> {
        self.delete_targets.lock().unwrap().clone()
    }

    async fn connection_error() -> DaemonError {
        // Manufacture a real reqwest transport error from an unroutable URL
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/unreachable")
            .timeout(std::time::Duration::from_millis(50))
            .send()
            .await
            .expect_err("request to closed port must fail");
        DaemonError::Connection(err)
    }
}

#[async_trait]
impl DaemonApi for MockDaemon {
    async fn notify_transfer_push(
        &self,
        _node: &Node,
        _server_uuid: Uuid,
        _token: &str,
    ) -> Result<(), DaemonError> {
        self.notify_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_server(&self, node: &Node, _server_uuid: Uuid) -> Result<(), DaemonError> {
        self.delete_count.fetch_add(1, Ordering::SeqCst);
        self.delete_targets.lock().unwrap().push(node.node_id);

        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::connection_error().await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: i64) -> Node {
        Node {
            node_id: id,
            name: format!("node-{}", id),
            scheme: "http".to_string(),
            fqdn: "localhost".to_string(),
            daemon_port: 8080,
        }
    }

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let mock = MockDaemon::new();
        let uuid = Uuid::new_v4();

        mock.notify_transfer_push(&node(1), uuid, "t").await.unwrap();
        mock.delete_server(&node(2), uuid).await.unwrap();
        mock.delete_server(&node(2), uuid).await.unwrap();

        assert_eq!(mock.notify_count(), 1);
        assert_eq!(mock.delete_count(), 2);
        assert_eq!(mock.delete_targets(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_mock_fail_delete() {
        let mock = MockDaemon::new();
        mock.set_fail_delete(true);

        let result = mock.delete_server(&node(1), Uuid::new_v4()).await;
        assert!(matches!(result, Err(DaemonError::Connection(_))));
        // The failed call is still counted
        assert_eq!(mock.delete_count(), 1);
    }
}
