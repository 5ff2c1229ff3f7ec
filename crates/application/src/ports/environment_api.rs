//! Environment API port
//!
//! Defines the interface to the backend resource collection that holds
//! environments and their variables.

use async_trait::async_trait;

use secretly_domain::{Environment, EnvironmentId, EnvironmentPayload, VariableId};

/// Errors that can occur while talking to the backend.
///
/// Any non-2xx response is a `Status` error; there is no status-specific
/// handling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("connection failed: {0}")]
    Transport(String),

    /// The request exceeded its deadline.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The backend answered with a non-2xx status.
    #[error("server responded with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error text from the response envelope, if any.
        message: Option<String>,
    },

    /// The response body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Port for the `/env` resource collection.
#[async_trait]
pub trait EnvironmentApi: Send + Sync {
    /// Fetches the full collection.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status or an
    /// undecodable body.
    async fn list(&self) -> Result<Vec<Environment>, ApiError>;

    /// Fetches only the environments with the given name.
    ///
    /// # Errors
    /// Same as [`EnvironmentApi::list`].
    async fn list_named(&self, name: &str) -> Result<Vec<Environment>, ApiError>;

    /// Creates an environment.
    ///
    /// Returns the backend-assigned id when the response carries one.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    async fn create(
        &self,
        payload: &EnvironmentPayload,
    ) -> Result<Option<EnvironmentId>, ApiError>;

    /// Replaces the fields of an existing environment.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    async fn update(&self, id: EnvironmentId, payload: &EnvironmentPayload)
    -> Result<(), ApiError>;

    /// Deletes an environment.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    async fn delete(&self, id: EnvironmentId) -> Result<(), ApiError>;

    /// Deletes one variable of an environment.
    ///
    /// # Errors
    /// Returns an error on transport failure or non-2xx status.
    async fn delete_variable(
        &self,
        environment: EnvironmentId,
        variable: VariableId,
    ) -> Result<(), ApiError>;
}
