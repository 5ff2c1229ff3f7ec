//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A `KEY=VALUE` assignment is malformed.
    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
