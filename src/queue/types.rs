//! Type definitions for the queue layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A message received from a queue.
///
/// `pop_receipt` is issued by the receive that produced this copy and must
/// accompany the delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub id: String,
    pub pop_receipt: String,
    pub content: String,
    pub dequeue_count: u32,
    pub inserted_at: DateTime<Utc>,
}

/// Queue listing entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// Queue-level properties; the count is eventually consistent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueProperties {
    pub approximate_message_count: usize,
    pub metadata: HashMap<String, String>,
}

/// Outcome of draining one poison queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequeueReport {
    pub queue: String,
    pub poison_queue: String,
    /// Messages sent to the live queue and deleted from the poison queue
    pub requeued: usize,
    /// Receive calls issued
    pub batches: usize,
}
