use thiserror::Error;

use crate::queue::QueueError;
use crate::transform::TransformError;

#[derive(Error, Debug)]
pub enum CourierError {
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CourierError {
    pub fn config<E: std::fmt::Display>(msg: E) -> Self {
        Self::Config(msg.to_string())
    }
}

/// Type alias for library Results
pub type LibResult<T> = std::result::Result<T, CourierError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;
