//! # Courier
//!
//! Record reshaping and poison-queue recovery for queue-driven integrations.
//!
//! ## Usage
//!
//! ```bash
//! courier transform --mapping contact.yaml --input contact.json --pretty
//! courier transform --mapping fields.json --mode exclusive < contact.json
//! courier validate --mapping contact.yaml
//! ```
//!
//! ## Modules
//!
//! - `transform` - Declarative mapping engine, subset projection and derivation combinators
//! - `queue` - Queue service interface, in-memory service and the poison-queue requeue loop
//! - `codec` - JSON encoding with tagged decimals and timestamps
//! - `config` - Requeue settings with serde defaults and environment overrides
//! - `error` - Crate-level error type
pub mod codec;
pub mod config;
pub mod error;
pub mod queue;
pub mod transform;

pub use config::{CourierConfig, RequeueConfig};
pub use error::{AppResult, CourierError, LibResult};
