//! Application error types

use thiserror::Error;

use crate::ports::ApiError;

/// Application-level errors.
///
/// `Fetch`, `Save` and `Delete` are the three failure kinds a user can see.
/// They carry the port error for diagnostics only; transient and permanent
/// failures are not told apart.
#[derive(Debug, Clone, Error)]
pub enum ApplicationError {
    /// Reading the collection failed.
    #[error("failed to load environments: {0}")]
    Fetch(ApiError),

    /// A create or update request failed.
    #[error("failed to save environment: {0}")]
    Save(ApiError),

    /// A delete request failed.
    #[error("failed to delete: {0}")]
    Delete(ApiError),

    /// The addressed row or variable does not exist in the mirror.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
