//! Save environment use case

use std::sync::Arc;

use secretly_domain::{Environment, EnvironmentId};

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::EnvironmentApi;

/// What a successful save did on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new environment was created. Carries the id when the backend
    /// reported one.
    Created(Option<EnvironmentId>),
    /// An existing environment was updated.
    Updated(EnvironmentId),
}

impl SaveOutcome {
    /// Returns the id of the saved environment, if known.
    #[must_use]
    pub const fn id(self) -> Option<EnvironmentId> {
        match self {
            Self::Created(id) => id,
            Self::Updated(id) => Some(id),
        }
    }
}

/// Creates or updates an environment, depending on whether it has an id.
pub struct SaveEnvironment<A> {
    api: Arc<A>,
}

impl<A: EnvironmentApi> SaveEnvironment<A> {
    /// Creates a new `SaveEnvironment` use case.
    pub const fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Executes the use case.
    ///
    /// Environments without an id are created with `POST`; the others are
    /// updated with `PUT`. Variables with a blank key are left out of the
    /// request body.
    ///
    /// # Errors
    /// Returns `ApplicationError::Save` if the backend rejects the request.
    pub async fn execute(&self, environment: &Environment) -> ApplicationResult<SaveOutcome> {
        let payload = environment.to_payload();
        match environment.id {
            None => {
                tracing::debug!(name = %payload.name, values = payload.values.len(), "POST environment");
                let id = self
                    .api
                    .create(&payload)
                    .await
                    .map_err(ApplicationError::Save)?;
                Ok(SaveOutcome::Created(id))
            }
            Some(id) => {
                tracing::debug!(%id, name = %payload.name, values = payload.values.len(), "PUT environment");
                self.api
                    .update(id, &payload)
                    .await
                    .map_err(ApplicationError::Save)?;
                Ok(SaveOutcome::Updated(id))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockApi, Op};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_save_new_environment_posts() {
        let api = MockApi::new();
        let use_case = SaveEnvironment::new(Arc::new(api.clone()));

        let mut env = Environment::new("dev");
        env.push_variable("PORT", "8080");
        env.push_variable(" ", "dropped");

        let outcome = use_case.execute(&env).await.expect("Should save");
        assert!(matches!(outcome, SaveOutcome::Created(Some(_))));

        let calls = api.calls();
        let Call::Create(payload) = &calls[0] else {
            panic!("expected a create call, got {calls:?}");
        };
        assert_eq!(payload.name, "dev");
        assert_eq!(payload.values.len(), 1);
    }

    #[tokio::test]
    async fn test_save_existing_environment_puts() {
        let api = MockApi::new();
        let id = api.seed("prod", &[("A", "1")]);
        let use_case = SaveEnvironment::new(Arc::new(api.clone()));

        let mut env = api.environments().remove(0);
        env.name = "production".to_string();

        let outcome = use_case.execute(&env).await.expect("Should save");
        assert_eq!(outcome, SaveOutcome::Updated(id));
        assert_eq!(api.environments()[0].name, "production");
        assert_eq!(api.environments()[0].id, Some(id));
    }

    #[tokio::test]
    async fn test_save_failure_is_save_error() {
        let api = MockApi::new();
        api.fail(Op::Create);
        let use_case = SaveEnvironment::new(Arc::new(api));

        let err = use_case.execute(&Environment::new("dev")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Save(_)));
    }
}
