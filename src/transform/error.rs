//! Error types for the transformation engine

use std::fmt;
use thiserror::Error;

/// Result type for transformation operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Why a dot-path lookup could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupReason {
    /// The mapping has no such key
    MissingKey,
    /// The index is outside the sequence
    IndexOutOfRange { len: usize },
    /// The container at this step cannot be indexed by the segment
    NotIndexable { found: &'static str },
}

impl fmt::Display for LookupReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey => write!(f, "key not present"),
            Self::IndexOutOfRange { len } => write!(f, "index out of range for length {}", len),
            Self::NotIndexable { found } => write!(f, "cannot index into {}", found),
        }
    }
}

/// Transformation error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The mapping specification itself is malformed
    #[error("Invalid specification: {0}")]
    InvalidSpecification(String),

    /// A strict dot-path lookup failed
    #[error("Lookup of '{path}' failed at segment '{segment}': {reason}")]
    LookupFailure {
        path: String,
        segment: String,
        reason: LookupReason,
    },

    /// A switch found no case matching its input
    #[error("No case implemented for value {0}")]
    UnhandledCase(String),

    /// A derivation function rejected its input
    #[error("Derivation failed: {0}")]
    Derivation(String),
}

impl TransformError {
    /// Create an invalid specification error
    pub fn invalid_spec<E: fmt::Display>(msg: E) -> Self {
        Self::InvalidSpecification(msg.to_string())
    }

    /// Create a derivation error
    pub fn derivation<E: fmt::Display>(msg: E) -> Self {
        Self::Derivation(msg.to_string())
    }

    /// Check if this is a lookup failure
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, Self::LookupFailure { .. })
    }

    /// Check if this is a specification error
    pub fn is_invalid_specification(&self) -> bool {
        matches!(self, Self::InvalidSpecification(_))
    }
}
