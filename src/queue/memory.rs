//! In-memory queue service for testing and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{QueueError, QueueResult};
use super::traits::QueueService;
use super::types::{QueueInfo, QueueMessage, QueueProperties};

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    content: String,
    pop_receipt: Option<String>,
    dequeue_count: u32,
    inserted_at: DateTime<Utc>,
    visible_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryQueue {
    metadata: HashMap<String, String>,
    messages: Vec<StoredMessage>,
}

/// In-memory queue service with visibility timeouts and pop receipts
#[derive(Debug, Clone, Default)]
pub struct MemoryQueueService {
    queues: Arc<RwLock<HashMap<String, MemoryQueue>>>,
}

impl MemoryQueueService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue if it does not exist yet
    pub async fn create_queue(&self, name: &str) {
        self.queues
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    /// Create a queue and attach metadata, replacing existing metadata
    pub async fn create_queue_with_metadata(&self, name: &str, metadata: HashMap<String, String>) {
        self.queues
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .metadata = metadata;
    }

    /// Contents of every message in the queue, visible or not, in insertion order
    pub async fn peek_all(&self, queue: &str) -> QueueResult<Vec<String>> {
        let queues = self.queues.read().await;
        let stored = queues
            .get(queue)
            .ok_or_else(|| QueueError::not_found(queue))?;
        Ok(stored.messages.iter().map(|m| m.content.clone()).collect())
    }
}

fn visibility_deadline(now: DateTime<Utc>, timeout: Duration) -> QueueResult<DateTime<Utc>> {
    let timeout = chrono::Duration::from_std(timeout)
        .map_err(|e| QueueError::configuration(format!("Invalid visibility timeout: {}", e)))?;
    Ok(now + timeout)
}

#[async_trait]
impl QueueService for MemoryQueueService {
    async fn list_queues(&self) -> QueueResult<Vec<QueueInfo>> {
        let queues = self.queues.read().await;
        let mut result: Vec<QueueInfo> = queues
            .iter()
            .map(|(name, queue)| QueueInfo {
                name: name.clone(),
                metadata: queue.metadata.clone(),
            })
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn properties(&self, queue: &str) -> QueueResult<QueueProperties> {
        let queues = self.queues.read().await;
        let stored = queues
            .get(queue)
            .ok_or_else(|| QueueError::not_found(queue))?;
        Ok(QueueProperties {
            approximate_message_count: stored.messages.len(),
            metadata: stored.metadata.clone(),
        })
    }

    async fn receive_messages(
        &self,
        queue: &str,
        max: usize,
        visibility_timeout: Duration,
    ) -> QueueResult<Vec<QueueMessage>> {
        let now = Utc::now();
        let hidden_until = visibility_deadline(now, visibility_timeout)?;
        let mut queues = self.queues.write().await;
        let stored = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::not_found(queue))?;

        let mut received = Vec::new();
        for message in stored
            .messages
            .iter_mut()
            .filter(|m| m.visible_at <= now)
            .take(max)
        {
            let receipt = Uuid::new_v4().to_string();
            message.pop_receipt = Some(receipt.clone());
            message.dequeue_count += 1;
            message.visible_at = hidden_until;
            received.push(QueueMessage {
                id: message.id.clone(),
                pop_receipt: receipt,
                content: message.content.clone(),
                dequeue_count: message.dequeue_count,
                inserted_at: message.inserted_at,
            });
        }
        Ok(received)
    }

    async fn delete_message(&self, queue: &str, message: &QueueMessage) -> QueueResult<()> {
        let mut queues = self.queues.write().await;
        let stored = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::not_found(queue))?;

        let position = stored
            .messages
            .iter()
            .position(|m| m.id == message.id)
            .ok_or_else(|| QueueError::not_found(format!("message {} in {}", message.id, queue)))?;

        if stored.messages[position].pop_receipt.as_deref() != Some(message.pop_receipt.as_str()) {
            return Err(QueueError::conflict(format!(
                "Pop receipt for message {} is no longer valid",
                message.id
            )));
        }

        stored.messages.remove(position);
        Ok(())
    }

    async fn send_message(&self, queue: &str, content: &str) -> QueueResult<()> {
        let now = Utc::now();
        let mut queues = self.queues.write().await;
        let stored = queues
            .get_mut(queue)
            .ok_or_else(|| QueueError::not_found(queue))?;
        stored.messages.push(StoredMessage {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            pop_receipt: None,
            dequeue_count: 0,
            inserted_at: now,
            visible_at: now,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEASE: Duration = Duration::from_secs(30);

    async fn service_with(queue: &str, payloads: &[&str]) -> MemoryQueueService {
        let service = MemoryQueueService::new();
        service.create_queue(queue).await;
        for payload in payloads {
            service.send_message(queue, payload).await.unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_receive_hides_messages() {
        let service = service_with("orders", &["a", "b", "c"]).await;

        let first = service.receive_messages("orders", 2, LEASE).await.unwrap();
        assert_eq!(
            first.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(first.iter().all(|m| m.dequeue_count == 1));

        let second = service.receive_messages("orders", 5, LEASE).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].content, "c");

        // Hidden messages still count and still exist
        assert_eq!(
            service.properties("orders").await.unwrap().approximate_message_count,
            3
        );
        assert_eq!(service.peek_all("orders").await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_zero_visibility_redelivers() {
        let service = service_with("orders", &["a"]).await;
        let first = service
            .receive_messages("orders", 1, Duration::ZERO)
            .await
            .unwrap();
        let second = service
            .receive_messages("orders", 1, Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].dequeue_count, 2);
        assert_ne!(second[0].pop_receipt, first[0].pop_receipt);
    }

    #[tokio::test]
    async fn test_delete_requires_current_receipt() {
        let service = service_with("orders", &["a"]).await;
        let stale = service
            .receive_messages("orders", 1, Duration::ZERO)
            .await
            .unwrap()
            .remove(0);
        let current = service
            .receive_messages("orders", 1, LEASE)
            .await
            .unwrap()
            .remove(0);

        let err = service.delete_message("orders", &stale).await.unwrap_err();
        assert!(err.is_conflict());

        service.delete_message("orders", &current).await.unwrap();
        assert!(service.peek_all("orders").await.unwrap().is_empty());

        let err = service.delete_message("orders", &current).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unknown_queue() {
        let service = MemoryQueueService::new();
        assert!(service.send_message("missing", "x").await.unwrap_err().is_not_found());
        assert!(service
            .receive_messages("missing", 1, LEASE)
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.properties("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_queues_sorted_with_metadata() {
        let service = MemoryQueueService::new();
        service.create_queue("orders").await;
        service
            .create_queue_with_metadata(
                "invoices-poison",
                HashMap::from([("owner".to_string(), "billing".to_string())]),
            )
            .await;

        let queues = service.list_queues().await.unwrap();
        assert_eq!(queues.len(), 2);
        assert_eq!(queues[0].name, "invoices-poison");
        assert_eq!(queues[0].metadata["owner"], "billing");
        assert_eq!(queues[1].name, "orders");
    }
}
