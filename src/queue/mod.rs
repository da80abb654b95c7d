//! Storage-queue access and the poison-queue requeue loop
//!
//! Queue clients are explicit objects implementing [`QueueService`]; callers
//! construct one at start-up and hand it to the components that need it.

mod error;
mod memory;
mod requeue;
mod traits;
mod types;

pub use error::{QueueError, QueueResult};
pub use memory::MemoryQueueService;
pub use requeue::{put_message, PoisonRequeuer};
pub use traits::QueueService;
pub use types::{QueueInfo, QueueMessage, QueueProperties, RequeueReport};
