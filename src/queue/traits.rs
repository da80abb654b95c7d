//! Queue service interface

use async_trait::async_trait;
use std::time::Duration;

use super::error::QueueResult;
use super::types::{QueueInfo, QueueMessage, QueueProperties};

/// Operations the requeue loop needs from a storage-queue service
#[async_trait]
pub trait QueueService: Send + Sync {
    /// List every queue with its metadata
    async fn list_queues(&self) -> QueueResult<Vec<QueueInfo>>;

    /// Read queue-level properties
    async fn properties(&self, queue: &str) -> QueueResult<QueueProperties>;

    /// Receive up to `max` messages, hiding them from other receivers for
    /// `visibility_timeout`
    async fn receive_messages(
        &self,
        queue: &str,
        max: usize,
        visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>>;

    /// Acknowledge a received message
    async fn delete_message(&self, queue: &str, message: &QueueMessage) -> QueueResult<()>;

    /// Append a payload to the queue
    async fn send_message(&self, queue: &str, content: &str) -> QueueResult<()>;
}
