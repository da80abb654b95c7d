//! Poison-queue requeue loop
//!
//! Moves messages from a poison queue back onto its live queue in bounded
//! batches. A message is deleted from the poison queue only after its payload
//! has been sent to the live queue, so a failure part way through leaves the
//! unsent message in place for the next scheduled run.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::{QueueError, QueueResult};
use super::traits::QueueService;
use super::types::RequeueReport;
use crate::config::RequeueConfig;

/// Drains poison queues back into their live queues
pub struct PoisonRequeuer {
    service: Arc<dyn QueueService>,
    config: RequeueConfig,
}

impl PoisonRequeuer {
    /// Create a requeuer; fails if the configuration breaks service limits
    pub fn new(service: Arc<dyn QueueService>, config: RequeueConfig) -> QueueResult<Self> {
        config.validate().map_err(QueueError::configuration)?;
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &RequeueConfig {
        &self.config
    }

    /// Poison queue name for a live queue
    pub fn poison_name(&self, live_queue: &str) -> String {
        format!("{}{}", live_queue, self.config.poison_suffix)
    }

    /// Live queue name for a poison queue, if the name carries the suffix
    pub fn live_name<'a>(&self, poison_queue: &'a str) -> Option<&'a str> {
        poison_queue
            .strip_suffix(self.config.poison_suffix.as_str())
            .filter(|live| !live.is_empty())
    }

    /// Move up to `max_count` messages from the poison queue of `live_queue`
    /// back onto `live_queue`.
    ///
    /// Stops early once a receive returns fewer messages than requested. The
    /// first send or delete failure aborts the run and is returned.
    pub async fn requeue(&self, live_queue: &str, max_count: usize) -> QueueResult<RequeueReport> {
        let poison_queue = self.poison_name(live_queue);
        let mut report = RequeueReport {
            queue: live_queue.to_string(),
            poison_queue: poison_queue.clone(),
            ..Default::default()
        };

        let mut remaining = max_count;
        while remaining > 0 {
            let requested = remaining.min(self.config.batch_size);
            let messages = self
                .service
                .receive_messages(&poison_queue, requested, self.config.visibility_timeout)
                .await?;
            report.batches += 1;
            debug!(
                "Received {} of {} requested messages from {}",
                messages.len(),
                requested,
                poison_queue
            );

            for message in &messages {
                tokio::time::sleep(self.config.pacing).await;

                if let Err(e) = self.service.send_message(live_queue, &message.content).await {
                    warn!(
                        "Failed to requeue message {} from {} to {}: {}",
                        message.id, poison_queue, live_queue, e
                    );
                    return Err(e);
                }
                self.service.delete_message(&poison_queue, message).await?;
                report.requeued += 1;
                debug!("Requeued message {} to {}", message.id, live_queue);
            }

            remaining = remaining.saturating_sub(messages.len());
            if messages.len() < requested {
                break;
            }
        }

        info!(
            "Requeued {} messages from {} in {} batches",
            report.requeued, poison_queue, report.batches
        );
        Ok(report)
    }

    /// Drain every non-empty poison queue, using its approximate count as
    /// the upper bound.
    pub async fn requeue_all(&self) -> QueueResult<Vec<RequeueReport>> {
        let queues = self.service.list_queues().await?;
        let mut reports = Vec::new();

        for queue in &queues {
            let Some(live_queue) = self.live_name(&queue.name) else {
                continue;
            };

            let properties = self.service.properties(&queue.name).await?;
            if properties.approximate_message_count == 0 {
                debug!("Poison queue {} is empty", queue.name);
                continue;
            }

            info!(
                "Poison queue {} holds about {} messages",
                queue.name, properties.approximate_message_count
            );
            reports.push(
                self.requeue(live_queue, properties.approximate_message_count)
                    .await?,
            );
        }

        Ok(reports)
    }
}

/// Send `payload` to `queue`, logging instead of propagating failures.
///
/// Returns whether the send succeeded.
pub async fn put_message(service: &dyn QueueService, queue: &str, payload: &str) -> bool {
    match service.send_message(queue, payload).await {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Failed to put message on queue {}: {} (payload: {})",
                queue, e, payload
            );
            false
        }
    }
}
