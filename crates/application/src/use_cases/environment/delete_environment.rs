//! Delete environment use case

use std::sync::Arc;

use secretly_domain::EnvironmentId;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::EnvironmentApi;

/// Deletes an environment on the backend.
pub struct DeleteEnvironment<A> {
    api: Arc<A>,
}

impl<A: EnvironmentApi> DeleteEnvironment<A> {
    /// Creates a new `DeleteEnvironment` use case.
    pub const fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns `ApplicationError::Delete` if the backend rejects the request.
    pub async fn execute(&self, id: EnvironmentId) -> ApplicationResult<()> {
        tracing::debug!(%id, "DELETE environment");
        self.api.delete(id).await.map_err(ApplicationError::Delete)
    }
}
