//! Optimistic-reload synchronization client.
//!
//! `SyncClient` keeps a local mirror of the backend environment collection.
//! Local edits only touch the mirror. Every successful mutation is followed
//! by a full reload that replaces the mirror, so the mirror is either
//! pristine from the last fetch or stale pending a refetch. It is never a
//! merge of the two.
//!
//! Each transition is published as an immutable [`Snapshot`] on a watch
//! channel, so a frontend can show intermediate states (such as a row
//! hidden while its delete is in flight) without borrowing the client.

use std::sync::Arc;

use secretly_domain::{Environment, EnvironmentRow, RowKey, RowState};
use tokio::sync::watch;

use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::EnvironmentApi;
use crate::use_cases::{
    DeleteEnvironment, DeleteVariable, ListEnvironments, SaveEnvironment, SaveOutcome,
};

/// Immutable view of the mirror at one point in time.
pub type Snapshot = Arc<[EnvironmentRow]>;

/// Local mirror of the backend environment collection.
pub struct SyncClient<A> {
    list: ListEnvironments<A>,
    save: SaveEnvironment<A>,
    delete_environment: DeleteEnvironment<A>,
    delete_variable: DeleteVariable<A>,
    rows: Vec<EnvironmentRow>,
    snapshots: watch::Sender<Snapshot>,
}

impl<A: EnvironmentApi> SyncClient<A> {
    /// Creates a client with an empty mirror.
    pub fn new(api: Arc<A>) -> Self {
        let (snapshots, _) = watch::channel(Snapshot::from(Vec::new()));
        Self {
            list: ListEnvironments::new(Arc::clone(&api)),
            save: SaveEnvironment::new(Arc::clone(&api)),
            delete_environment: DeleteEnvironment::new(Arc::clone(&api)),
            delete_variable: DeleteVariable::new(api),
            rows: Vec::new(),
            snapshots,
        }
    }

    /// Subscribes to mirror changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    /// Returns the current mirror as an immutable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.rows.iter().cloned().collect()
    }

    /// Returns all rows, including hidden ones.
    #[must_use]
    pub fn rows(&self) -> &[EnvironmentRow] {
        &self.rows
    }

    /// Looks up a row.
    #[must_use]
    pub fn row(&self, key: RowKey) -> Option<&EnvironmentRow> {
        self.rows.iter().find(|r| r.key == key)
    }

    /// Finds the first visible row with the given environment name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&EnvironmentRow> {
        self.rows
            .iter()
            .find(|r| r.state.is_visible() && r.environment.name == name)
    }

    /// Replaces the whole mirror with the canonical collection.
    ///
    /// Unsaved drafts are dropped along with everything else.
    ///
    /// # Errors
    /// Returns `ApplicationError::Fetch` on failure. The mirror is left
    /// untouched in that case.
    pub async fn load_all(&mut self) -> ApplicationResult<Snapshot> {
        let environments = self.list.execute().await?;
        self.rows = environments.into_iter().map(EnvironmentRow::saved).collect();
        tracing::info!(environments = self.rows.len(), "mirror reloaded");
        Ok(self.publish())
    }

    /// Fetches the environments with the given name without touching the
    /// mirror.
    ///
    /// # Errors
    /// Returns `ApplicationError::Fetch` on failure.
    pub async fn load_named(&self, name: &str) -> ApplicationResult<Vec<Environment>> {
        self.list.execute_named(name).await
    }

    /// Appends a new unsaved environment draft.
    pub fn add_environment_row(&mut self, name: impl Into<String>) -> RowKey {
        let row = EnvironmentRow::unsaved(Environment::new(name));
        let key = row.key;
        self.rows.push(row);
        self.publish();
        key
    }

    /// Renames an environment draft.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` for an unknown row.
    pub fn rename_environment(&mut self, row: RowKey, name: impl Into<String>) -> ApplicationResult<()> {
        self.row_mut(row)?.environment.name = name.into();
        self.publish();
        Ok(())
    }

    /// Appends an empty variable row to a draft.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` for an unknown row.
    pub fn add_variable_row(&mut self, row: RowKey) -> ApplicationResult<RowKey> {
        let key = self.row_mut(row)?.environment.add_variable_row();
        self.publish();
        Ok(key)
    }

    /// Overwrites the key and value of one variable row.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` for an unknown row or variable.
    pub fn edit_variable(
        &mut self,
        row: RowKey,
        variable: RowKey,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ApplicationResult<()> {
        let entry = self
            .row_mut(row)?
            .environment
            .variable_mut(variable)
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {variable}")))?;
        entry.key = key.into();
        entry.value = value.into();
        self.publish();
        Ok(())
    }

    /// Sets a variable by key in a draft, adding a row if the key is new.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` for an unknown row.
    pub fn set_variable(
        &mut self,
        row: RowKey,
        key: &str,
        value: impl Into<String>,
    ) -> ApplicationResult<RowKey> {
        let key = self.row_mut(row)?.environment.set_variable(key, value);
        self.publish();
        Ok(key)
    }

    /// Removes a variable row from a draft. Nothing is sent to the backend.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` for an unknown row or variable.
    pub fn remove_variable_row(&mut self, row: RowKey, variable: RowKey) -> ApplicationResult<()> {
        self.row_mut(row)?
            .environment
            .remove_variable_row(variable)
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {variable}")))?;
        self.publish();
        Ok(())
    }

    /// Creates or updates the environment held by `row`, then reloads.
    ///
    /// The mirror is never patched with the result of the save. On success
    /// the canonical environment is looked up in the reloaded mirror; it is
    /// `None` when the backend did not report an id for a new environment or
    /// the environment vanished before the reload.
    ///
    /// # Errors
    /// Returns `ApplicationError::Save` if the request fails; the draft and
    /// its state are kept as they were so the save can be retried. Returns
    /// `ApplicationError::Fetch` if the save succeeded but the reload did
    /// not.
    pub async fn create_or_update_environment(
        &mut self,
        row: RowKey,
    ) -> ApplicationResult<Option<Environment>> {
        let index = self.position(row)?;
        let previous = self.rows[index].state;
        self.rows[index].state = RowState::Saving;
        self.publish();

        let draft = self.rows[index].environment.clone();
        let outcome = match self.save.execute(&draft).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.rows[index].state = previous;
                self.publish();
                return Err(e);
            }
        };
        tracing::info!(name = %draft.name, ?outcome, "environment saved");

        // Keeps a retry from creating a duplicate if the reload below fails.
        self.rows[index].state = RowState::Saved;
        if let SaveOutcome::Created(Some(id)) = outcome {
            self.rows[index].environment.id = Some(id);
        }

        self.load_all().await?;
        Ok(outcome.id().and_then(|id| {
            self.rows
                .iter()
                .find(|r| r.environment.id == Some(id))
                .map(|r| r.environment.clone())
        }))
    }

    /// Deletes the environment held by `row`, then reloads.
    ///
    /// The row is hidden while the request is in flight. A row that was
    /// never saved is removed locally without any request.
    ///
    /// # Errors
    /// Returns `ApplicationError::Delete` if the request fails; the row is
    /// restored to its previous state. Returns `ApplicationError::Fetch` if
    /// the delete succeeded but the reload did not.
    pub async fn delete_environment(&mut self, row: RowKey) -> ApplicationResult<()> {
        let index = self.position(row)?;
        let Some(id) = self.rows[index].environment.id else {
            self.rows.remove(index);
            self.publish();
            return Ok(());
        };

        let previous = self.rows[index].state;
        self.rows[index].state = RowState::Deleting;
        self.publish();

        if let Err(e) = self.delete_environment.execute(id).await {
            tracing::warn!(%id, error = %e, "delete failed, restoring row");
            self.rows[index].state = previous;
            self.publish();
            return Err(e);
        }
        tracing::info!(%id, "environment deleted");
        self.rows[index].state = RowState::Removed;
        self.publish();

        self.load_all().await.map(|_| ())
    }

    /// Deletes one variable of the environment held by `row`, then reloads.
    ///
    /// The variable is removed from the draft before the request is sent. A
    /// variable that was never saved, or that belongs to an unsaved
    /// environment, is only removed locally.
    ///
    /// # Errors
    /// Returns `ApplicationError::Delete` if the request fails; the variable
    /// is put back at its former position. Returns `ApplicationError::Fetch`
    /// if the delete succeeded but the reload did not.
    pub async fn delete_variable(&mut self, row: RowKey, variable: RowKey) -> ApplicationResult<()> {
        let index = self.position(row)?;
        let environment_id = self.rows[index].environment.id;
        let (position, removed) = self.rows[index]
            .environment
            .remove_variable_row(variable)
            .ok_or_else(|| ApplicationError::NotFound(format!("variable {variable}")))?;
        self.publish();

        let (Some(environment_id), Some(variable_id)) = (environment_id, removed.id) else {
            return Ok(());
        };

        if let Err(e) = self
            .delete_variable
            .execute(environment_id, variable_id)
            .await
        {
            tracing::warn!(%environment_id, %variable_id, error = %e, "delete failed, restoring variable");
            self.rows[index]
                .environment
                .restore_variable(position, removed);
            self.publish();
            return Err(e);
        }
        tracing::info!(%environment_id, %variable_id, "variable deleted");

        self.load_all().await.map(|_| ())
    }

    fn position(&self, row: RowKey) -> ApplicationResult<usize> {
        self.rows
            .iter()
            .position(|r| r.key == row)
            .ok_or_else(|| ApplicationError::NotFound(format!("environment row {row}")))
    }

    fn row_mut(&mut self, row: RowKey) -> ApplicationResult<&mut EnvironmentRow> {
        self.rows
            .iter_mut()
            .find(|r| r.key == row)
            .ok_or_else(|| ApplicationError::NotFound(format!("environment row {row}")))
    }

    fn publish(&self) -> Snapshot {
        let snapshot = self.snapshot();
        self.snapshots.send_replace(Arc::clone(&snapshot));
        snapshot
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::significant_drop_tightening
)]
mod tests {
    use super::*;
    use crate::test_support::{Call, MockApi, Op};
    use pretty_assertions::assert_eq;
    use secretly_domain::{EnvironmentId, EnvironmentPayload, VariablePayload};

    fn client(api: &MockApi) -> SyncClient<MockApi> {
        SyncClient::new(Arc::new(api.clone()))
    }

    /// Rows without the client-local keys, for comparing two reloads.
    fn contents(snapshot: &Snapshot) -> Vec<(Option<EnvironmentId>, String, Vec<(String, String)>)> {
        snapshot
            .iter()
            .map(|r| {
                (
                    r.environment.id,
                    r.environment.name.clone(),
                    r.environment
                        .variables
                        .iter()
                        .map(|v| (v.key.clone(), v.value.clone()))
                        .collect(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_reload_is_idempotent() {
        let api = MockApi::new();
        api.seed("dev", &[("PORT", "8080")]);
        api.seed("prod", &[("PORT", "80"), ("DEBUG", "")]);
        let mut client = client(&api);

        let first = client.load_all().await.unwrap();
        let second = client.load_all().await.unwrap();
        assert_eq!(contents(&first), contents(&second));
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn test_create_round_trip() {
        let api = MockApi::new();
        let mut client = client(&api);

        let row = client.add_environment_row("prod");
        client.set_variable(row, "A", "1").unwrap();
        let saved = client
            .create_or_update_environment(row)
            .await
            .unwrap()
            .expect("saved environment is in the mirror");

        assert_eq!(saved.name, "prod");
        assert!(saved.id.is_some());
        assert_eq!(saved.variables.len(), 1);
        assert_eq!(saved.variables[0].key, "A");
        assert_eq!(saved.variables[0].value, "1");
        assert!(saved.variables[0].id.is_some());

        let snapshot = client.load_all().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].environment.id, saved.id);
        assert_eq!(snapshot[0].state, RowState::Saved);
    }

    #[tokio::test]
    async fn test_update_preserves_identity() {
        let api = MockApi::new();
        let id = api.seed("prod", &[("A", "1")]);
        let mut client = client(&api);
        client.load_all().await.unwrap();

        let row = client.find_by_name("prod").unwrap().key;
        client.rename_environment(row, "production").unwrap();
        let saved = client.create_or_update_environment(row).await.unwrap().unwrap();
        assert_eq!(saved.id, Some(id));

        let snapshot = client.load_all().await.unwrap();
        assert_eq!(snapshot[0].environment.id, Some(id));
        assert_eq!(snapshot[0].environment.name, "production");
        assert_eq!(api.count(|c| matches!(c, Call::Update(..))), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_from_canonical_list() {
        let api = MockApi::new();
        let id = api.seed("dev", &[]);
        api.seed("prod", &[]);
        let mut client = client(&api);
        client.load_all().await.unwrap();

        let row = client.find_by_name("dev").unwrap().key;
        client.delete_environment(row).await.unwrap();

        let snapshot = client.load_all().await.unwrap();
        assert!(snapshot.iter().all(|r| r.environment.id != Some(id)));
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_preserves_draft() {
        let api = MockApi::new();
        api.fail(Op::Create);
        let mut client = client(&api);

        let row = client.add_environment_row("dev");
        let variable = client.add_variable_row(row).unwrap();
        client.edit_variable(row, variable, "PORT", "8080").unwrap();
        let before = client.row(row).unwrap().clone();

        let err = client.create_or_update_environment(row).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Save(_)));
        assert_eq!(client.row(row).unwrap(), &before);
        assert_eq!(api.count(|c| matches!(c, Call::List)), 0);

        api.recover(Op::Create);
        let saved = client.create_or_update_environment(row).await.unwrap();
        assert_eq!(saved.unwrap().variables[0].key, "PORT");
    }

    #[tokio::test]
    async fn test_blank_keys_are_not_sent() {
        let api = MockApi::new();
        let mut client = client(&api);

        let row = client.add_environment_row("dev");
        client.set_variable(row, "A", "1").unwrap();
        let blank = client.add_variable_row(row).unwrap();
        client.edit_variable(row, blank, "   ", "x").unwrap();
        client.create_or_update_environment(row).await.unwrap();

        let Call::Create(payload) = &api.calls()[0] else {
            panic!("expected create");
        };
        assert_eq!(payload.values.len(), 1);
        assert_eq!(payload.values[0].key, "A");
    }

    #[tokio::test]
    async fn test_new_environment_scenario() {
        let api = MockApi::new();
        let mut client = client(&api);
        assert!(client.load_all().await.unwrap().is_empty());

        let row = client.add_environment_row("dev");
        let variable = client.add_variable_row(row).unwrap();
        client.edit_variable(row, variable, "PORT", "8080").unwrap();
        client.create_or_update_environment(row).await.unwrap();

        let calls = api.calls();
        assert_eq!(
            calls,
            vec![
                Call::List,
                Call::Create(EnvironmentPayload {
                    name: "dev".to_string(),
                    values: vec![VariablePayload {
                        id: None,
                        key: "PORT".to_string(),
                        value: "8080".to_string(),
                    }],
                }),
                Call::List,
            ]
        );
    }

    #[tokio::test]
    async fn test_reload_drops_unsaved_drafts() {
        let api = MockApi::new();
        api.seed("prod", &[]);
        let mut client = client(&api);
        client.add_environment_row("draft");

        let snapshot = client.load_all().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].environment.name, "prod");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_mirror() {
        let api = MockApi::new();
        api.seed("prod", &[]);
        let mut client = client(&api);
        let before = client.load_all().await.unwrap();

        api.fail(Op::List);
        let err = client.load_all().await.unwrap_err();
        assert!(matches!(err, ApplicationError::Fetch(_)));
        assert_eq!(client.snapshot(), before);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_row() {
        let api = MockApi::new();
        api.seed("dev", &[]);
        api.seed("prod", &[]);
        let mut client = client(&api);
        client.load_all().await.unwrap();
        let before = client.snapshot();

        api.fail(Op::Delete);
        let row = client.find_by_name("dev").unwrap().key;
        let err = client.delete_environment(row).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Delete(_)));
        assert_eq!(client.snapshot(), before);
        assert_eq!(api.count(|c| matches!(c, Call::List)), 1);
    }

    #[tokio::test]
    async fn test_row_hidden_while_delete_in_flight() {
        let api = MockApi::new();
        api.seed("dev", &[]);
        let (entered, release) = api.gate_deletes();
        let mut client = client(&api);
        client.load_all().await.unwrap();
        let row = client.find_by_name("dev").unwrap().key;
        let snapshots = client.subscribe();

        let task = tokio::spawn(async move {
            let result = client.delete_environment(row).await;
            (client, result)
        });

        entered.notified().await;
        {
            let current = snapshots.borrow();
            assert_eq!(current[0].state, RowState::Deleting);
            assert!(!current[0].state.is_visible());
        }
        release.notify_one();

        let (client, result) = task.await.unwrap();
        result.unwrap();
        assert!(client.rows().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unsaved_environment_is_local() {
        let api = MockApi::new();
        let mut client = client(&api);
        let row = client.add_environment_row("draft");

        client.delete_environment(row).await.unwrap();
        assert!(client.rows().is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_variable_then_reload() {
        let api = MockApi::new();
        api.seed("dev", &[("A", "1"), ("B", "2")]);
        let mut client = client(&api);
        client.load_all().await.unwrap();

        let env = client.find_by_name("dev").unwrap();
        let (row, variable) = (env.key, env.environment.variables[0].row);
        client.delete_variable(row, variable).await.unwrap();

        let env = &client.rows()[0].environment;
        assert_eq!(env.variables.len(), 1);
        assert_eq!(env.variables[0].key, "B");
        assert_eq!(api.count(|c| matches!(c, Call::DeleteVariable(..))), 1);
    }

    #[tokio::test]
    async fn test_failed_variable_delete_restores_position() {
        let api = MockApi::new();
        api.seed("dev", &[("A", "1"), ("B", "2"), ("C", "3")]);
        let mut client = client(&api);
        client.load_all().await.unwrap();
        api.fail(Op::DeleteVariable);

        let env = client.find_by_name("dev").unwrap();
        let (row, variable) = (env.key, env.environment.variables[1].row);
        let err = client.delete_variable(row, variable).await.unwrap_err();
        assert!(matches!(err, ApplicationError::Delete(_)));

        let keys: Vec<_> = client.rows()[0]
            .environment
            .variables
            .iter()
            .map(|v| v.key.clone())
            .collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_delete_unsaved_variable_is_local() {
        let api = MockApi::new();
        api.seed("dev", &[("A", "1")]);
        let mut client = client(&api);
        client.load_all().await.unwrap();
        let row = client.find_by_name("dev").unwrap().key;
        let variable = client.add_variable_row(row).unwrap();

        client.delete_variable(row, variable).await.unwrap();
        assert_eq!(client.rows()[0].environment.variables.len(), 1);
        assert_eq!(api.count(|c| matches!(c, Call::DeleteVariable(..))), 0);
    }

    #[tokio::test]
    async fn test_remove_variable_row_is_local_until_save() {
        let api = MockApi::new();
        let id = api.seed("dev", &[("A", "1"), ("B", "2")]);
        let kept = api.environments()[0].variables[1].id;
        let mut client = client(&api);
        client.load_all().await.unwrap();
        assert_eq!(api.calls(), vec![Call::List]);

        let env = client.find_by_name("dev").unwrap();
        let (row, variable) = (env.key, env.environment.variables[0].row);
        client.remove_variable_row(row, variable).unwrap();

        let env = &client.row(row).unwrap().environment;
        assert_eq!(env.variable_count(), 1);
        assert_eq!(env.variables[0].key, "B");
        assert_eq!(client.row(row).unwrap().state, RowState::Saved);
        assert_eq!(api.calls(), vec![Call::List]);
        assert_eq!(api.environments()[0].variables.len(), 2);

        client.create_or_update_environment(row).await.unwrap();
        assert_eq!(
            api.calls()[1],
            Call::Update(
                id,
                EnvironmentPayload {
                    name: "dev".to_string(),
                    values: vec![VariablePayload {
                        id: kept,
                        key: "B".to_string(),
                        value: "2".to_string(),
                    }],
                }
            )
        );
        assert_eq!(client.rows()[0].environment.variable_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_unknown_variable_row() {
        let api = MockApi::new();
        let mut client = client(&api);
        let row = client.add_environment_row("draft");

        let err = client
            .remove_variable_row(row, RowKey::generate())
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_row_sends_nothing() {
        let api = MockApi::new();
        let mut client = client(&api);
        let stray = RowKey::generate();

        assert!(matches!(
            client.create_or_update_environment(stray).await,
            Err(ApplicationError::NotFound(_))
        ));
        assert!(matches!(
            client.delete_environment(stray).await,
            Err(ApplicationError::NotFound(_))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_named_leaves_mirror_alone() {
        let api = MockApi::new();
        api.seed("dev", &[]);
        api.seed("prod", &[]);
        let client = client(&api);

        let found = client.load_named("prod").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(client.rows().is_empty());
    }
}
