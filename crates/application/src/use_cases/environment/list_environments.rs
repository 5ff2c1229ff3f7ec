//! List environments use case

use std::sync::Arc;

use secretly_domain::Environment;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::EnvironmentApi;

/// Reads the canonical environment collection from the backend.
pub struct ListEnvironments<A> {
    api: Arc<A>,
}

impl<A: EnvironmentApi> ListEnvironments<A> {
    /// Creates a new `ListEnvironments` use case.
    pub const fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Executes the use case.
    ///
    /// # Errors
    /// Returns `ApplicationError::Fetch` if the collection cannot be read.
    pub async fn execute(&self) -> ApplicationResult<Vec<Environment>> {
        tracing::debug!("GET environments");
        self.api.list().await.map_err(ApplicationError::Fetch)
    }

    /// Executes the use case filtered by environment name.
    ///
    /// # Errors
    /// Returns `ApplicationError::Fetch` if the collection cannot be read.
    pub async fn execute_named(&self, name: &str) -> ApplicationResult<Vec<Environment>> {
        tracing::debug!(name, "GET environments by name");
        self.api
            .list_named(name)
            .await
            .map_err(ApplicationError::Fetch)
    }
}
