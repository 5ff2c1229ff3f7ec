//! Delete variable use case

use std::sync::Arc;

use secretly_domain::{EnvironmentId, VariableId};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::EnvironmentApi;

/// Deletes one variable of an environment on the backend.
pub struct DeleteVariable<A> {
    api: Arc<A>,
}

impl<A: EnvironmentApi> DeleteVariable<A> {
    /// Creates a new `DeleteVariable` use case.
    pub const fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns `ApplicationError::Delete` if the backend rejects the request.
    pub async fn execute(
        &self,
        environment: EnvironmentId,
        variable: VariableId,
    ) -> ApplicationResult<()> {
        tracing::debug!(%environment, %variable, "DELETE variable");
        self.api
            .delete_variable(environment, variable)
            .await
            .map_err(ApplicationError::Delete)
    }
}
