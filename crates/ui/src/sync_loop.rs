//! The synchronization loop.
//!
//! Commands are taken off a channel and executed one at a time against a
//! [`SyncClient`]. Failures are caught here, logged and turned into
//! notifications; nothing propagates past the loop.

use secretly_application::{ApplicationResult, EnvironmentApi, SyncClient};
use tokio::sync::mpsc;

use crate::bridge::{SyncCommand, UiUpdate};
use crate::notification::{
    DELETE_ENVIRONMENT_FAILED, DELETE_VARIABLE_FAILED, LOAD_FAILED, Notification,
};
use crate::render::{RevealSet, View, render};

/// Owns the client and the reveal state, and serializes all commands.
pub struct SyncLoop<A> {
    client: SyncClient<A>,
    revealed: RevealSet,
}

impl<A: EnvironmentApi> SyncLoop<A> {
    /// Creates a loop around `client`.
    pub fn new(client: SyncClient<A>) -> Self {
        Self {
            client,
            revealed: RevealSet::new(),
        }
    }

    /// Renders the current mirror.
    #[must_use]
    pub fn view(&self) -> View {
        render(self.client.rows(), &self.revealed)
    }

    /// Runs until the command channel closes or the update receiver is
    /// dropped.
    ///
    /// Intermediate mirror states published while a command is in flight,
    /// such as a row hidden during its delete, are forwarded as renders.
    /// Every command ends with [`UiUpdate::Settled`].
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<SyncCommand>,
        updates: mpsc::UnboundedSender<UiUpdate>,
    ) {
        let mut snapshots = self.client.subscribe();

        while let Some(cmd) = commands.recv().await {
            tracing::debug!(?cmd, "handling command");
            snapshots.borrow_and_update();
            let revealed = self.revealed.clone();

            let handled = self.handle(cmd);
            tokio::pin!(handled);
            let results = loop {
                tokio::select! {
                    results = &mut handled => break results,
                    Ok(()) = snapshots.changed() => {
                        let snapshot = snapshots.borrow_and_update().clone();
                        if updates.send(UiUpdate::Render(render(&snapshot, &revealed))).is_err() {
                            tracing::debug!("update receiver dropped");
                            return;
                        }
                    }
                }
            };

            for update in results.into_iter().chain(std::iter::once(UiUpdate::Settled)) {
                if updates.send(update).is_err() {
                    tracing::debug!("update receiver dropped");
                    return;
                }
            }
        }
        tracing::debug!("command channel closed");
    }

    /// Executes one command and returns the updates it produced.
    pub async fn handle(&mut self, cmd: SyncCommand) -> Vec<UiUpdate> {
        match cmd {
            SyncCommand::Reload => match self.client.load_all().await {
                Ok(_) => vec![UiUpdate::Render(self.view())],
                Err(e) => {
                    tracing::warn!(error = %e, "reload failed");
                    vec![UiUpdate::Notify(Notification::error(LOAD_FAILED))]
                }
            },

            SyncCommand::Lookup { name } => match self.client.load_named(&name).await {
                Ok(environments) => vec![UiUpdate::Found { name, environments }],
                Err(e) => {
                    tracing::warn!(%name, error = %e, "lookup failed");
                    vec![UiUpdate::Notify(Notification::error(LOAD_FAILED))]
                }
            },

            SyncCommand::AddEnvironment { name } => {
                let row = self.client.add_environment_row(name);
                vec![UiUpdate::EnvironmentAdded { row }, UiUpdate::Render(self.view())]
            }

            SyncCommand::RenameEnvironment { row, name } => {
                let result = self.client.rename_environment(row, name);
                self.local(result, |_| None)
            }

            SyncCommand::AddVariableRow { row } => {
                let result = self.client.add_variable_row(row);
                self.local(result, |variable| {
                    Some(UiUpdate::VariableAdded { row, variable })
                })
            }

            SyncCommand::EditVariable {
                row,
                variable,
                key,
                value,
            } => {
                let result = self.client.edit_variable(row, variable, key, value);
                self.local(result, |()| None)
            }

            SyncCommand::SetVariable { row, key, value } => {
                let result = self.client.set_variable(row, &key, value);
                self.local(result, |variable| {
                    Some(UiUpdate::VariableAdded { row, variable })
                })
            }

            SyncCommand::RemoveVariableRow { row, variable } => {
                let result = self.client.remove_variable_row(row, variable);
                self.local(result, |()| None)
            }

            SyncCommand::Save { row } => {
                let result = self.client.create_or_update_environment(row).await;
                self.remote(result.map(|_| ()), "Environment saved", "")
            }

            SyncCommand::DeleteEnvironment { row } => {
                let result = self.client.delete_environment(row).await;
                self.remote(result, "Environment deleted", DELETE_ENVIRONMENT_FAILED)
            }

            SyncCommand::DeleteVariable { row, variable } => {
                let result = self.client.delete_variable(row, variable).await;
                self.remote(result, "Variable deleted", DELETE_VARIABLE_FAILED)
            }

            SyncCommand::ToggleReveal { row } => {
                match self.client.row(row) {
                    Some(entry) => {
                        self.revealed.toggle(entry);
                    }
                    None => {
                        tracing::warn!(%row, "reveal for unknown row");
                    }
                }
                vec![UiUpdate::Render(self.view())]
            }
        }
    }

    fn local<T>(
        &self,
        result: ApplicationResult<T>,
        added: impl FnOnce(T) -> Option<UiUpdate>,
    ) -> Vec<UiUpdate> {
        match result {
            Ok(value) => added(value)
                .into_iter()
                .chain(std::iter::once(UiUpdate::Render(self.view())))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "local edit rejected");
                vec![UiUpdate::Notify(Notification::for_failure(&e, ""))]
            }
        }
    }

    fn remote(
        &self,
        result: ApplicationResult<()>,
        success: &str,
        delete_text: &str,
    ) -> Vec<UiUpdate> {
        let notification = match result {
            Ok(()) => Notification::success(success),
            Err(e) => {
                tracing::warn!(error = %e, "operation failed");
                Notification::for_failure(&e, delete_text)
            }
        };
        vec![UiUpdate::Render(self.view()), UiUpdate::Notify(notification)]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::notification::{NotificationLevel, SAVE_FAILED};
    use secretly_application::test_support::{MockApi, Op};
    use pretty_assertions::assert_eq;
    use secretly_domain::{RowKey, SECRET_MASK};
    use std::sync::Arc;

    fn sync_loop(backend: &MockApi) -> SyncLoop<MockApi> {
        SyncLoop::new(SyncClient::new(Arc::new(backend.clone())))
    }

    fn last_view(updates: &[UiUpdate]) -> View {
        updates
            .iter()
            .rev()
            .find_map(|u| match u {
                UiUpdate::Render(view) => Some(view.clone()),
                _ => None,
            })
            .expect("a render")
    }

    fn notification(updates: &[UiUpdate]) -> Notification {
        updates
            .iter()
            .find_map(|u| match u {
                UiUpdate::Notify(n) => Some(n.clone()),
                _ => None,
            })
            .expect("a notification")
    }

    fn added_row(updates: &[UiUpdate]) -> RowKey {
        updates
            .iter()
            .find_map(|u| match u {
                UiUpdate::EnvironmentAdded { row } => Some(*row),
                _ => None,
            })
            .expect("an added row")
    }

    #[tokio::test]
    async fn test_reload_renders_masked_values() {
        let backend = MockApi::new();
        backend.seed("dev", &[("TOKEN", "abc")]);
        let mut sync = sync_loop(&backend);

        let updates = sync.handle(SyncCommand::Reload).await;
        let view = last_view(&updates);
        assert_eq!(view.environments.len(), 1);
        assert_eq!(view.environments[0].variables[0].value, SECRET_MASK);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_view() {
        let backend = MockApi::new();
        backend.seed("dev", &[]);
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;
        let before = sync.view();

        backend.fail(Op::List);
        backend.seed("prod", &[]);
        let updates = sync.handle(SyncCommand::Reload).await;

        assert_eq!(
            updates,
            vec![UiUpdate::Notify(Notification::error(LOAD_FAILED))]
        );
        assert_eq!(sync.view(), before);
    }

    #[tokio::test]
    async fn test_create_flow() {
        let backend = MockApi::new();
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;

        let row = added_row(
            &sync
                .handle(SyncCommand::AddEnvironment {
                    name: "dev".to_string(),
                })
                .await,
        );
        sync.handle(SyncCommand::SetVariable {
            row,
            key: "PORT".to_string(),
            value: "8080".to_string(),
        })
        .await;
        let updates = sync.handle(SyncCommand::Save { row }).await;

        assert_eq!(
            notification(&updates),
            Notification::success("Environment saved")
        );
        let view = last_view(&updates);
        assert_eq!(view.environments.len(), 1);
        assert!(view.environments[0].id.is_some());
        assert_eq!(backend.environments()[0].variables[0].key, "PORT");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft() {
        let backend = MockApi::new();
        backend.fail(Op::Create);
        let mut sync = sync_loop(&backend);

        let row = added_row(
            &sync
                .handle(SyncCommand::AddEnvironment {
                    name: "dev".to_string(),
                })
                .await,
        );
        let updates = sync.handle(SyncCommand::Save { row }).await;

        assert_eq!(notification(&updates), Notification::error(SAVE_FAILED));
        let view = last_view(&updates);
        assert_eq!(view.environments[0].name, "dev");
        assert_eq!(view.environments[0].state, secretly_domain::RowState::Unsaved);

        backend.recover(Op::Create);
        let updates = sync.handle(SyncCommand::Save { row }).await;
        assert_eq!(notification(&updates).level, NotificationLevel::Success);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_row() {
        let backend = MockApi::new();
        backend.seed("dev", &[]);
        backend.fail(Op::Delete);
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;
        let row = sync.view().environments[0].row;

        let updates = sync.handle(SyncCommand::DeleteEnvironment { row }).await;
        assert_eq!(
            notification(&updates),
            Notification::error(DELETE_ENVIRONMENT_FAILED)
        );
        assert_eq!(last_view(&updates).environments.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_variable_delete_message() {
        let backend = MockApi::new();
        backend.seed("dev", &[("A", "1"), ("B", "2")]);
        backend.fail(Op::DeleteVariable);
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;
        let env = sync.view().environments[0].clone();

        let updates = sync
            .handle(SyncCommand::DeleteVariable {
                row: env.row,
                variable: env.variables[0].row,
            })
            .await;
        assert_eq!(
            notification(&updates),
            Notification::error(DELETE_VARIABLE_FAILED)
        );
        let keys: Vec<_> = last_view(&updates).environments[0]
            .variables
            .iter()
            .map(|v| v.key.clone())
            .collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_remove_variable_row_renders_without_request() {
        let backend = MockApi::new();
        backend.seed("dev", &[("A", "1"), ("B", "2")]);
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;
        let env = sync.view().environments[0].clone();

        let updates = sync
            .handle(SyncCommand::RemoveVariableRow {
                row: env.row,
                variable: env.variables[0].row,
            })
            .await;
        let keys: Vec<_> = last_view(&updates).environments[0]
            .variables
            .iter()
            .map(|v| v.key.clone())
            .collect();
        assert_eq!(keys, vec!["B"]);
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(backend.environments()[0].variables.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_row_is_reported() {
        let backend = MockApi::new();
        let mut sync = sync_loop(&backend);

        let updates = sync
            .handle(SyncCommand::RenameEnvironment {
                row: RowKey::generate(),
                name: "x".to_string(),
            })
            .await;
        assert!(notification(&updates).is_error());
    }

    #[tokio::test]
    async fn test_toggle_reveal() {
        let backend = MockApi::new();
        backend.seed("dev", &[("TOKEN", "abc")]);
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;
        let row = sync.view().environments[0].row;

        let updates = sync.handle(SyncCommand::ToggleReveal { row }).await;
        assert_eq!(last_view(&updates).environments[0].variables[0].value, "abc");

        // Still revealed after a reload hands out new row keys.
        let updates = sync.handle(SyncCommand::Reload).await;
        assert_eq!(last_view(&updates).environments[0].variables[0].value, "abc");
    }

    #[tokio::test]
    async fn test_lookup_does_not_touch_view() {
        let backend = MockApi::new();
        backend.seed("dev", &[]);
        backend.seed("prod", &[]);
        let mut sync = sync_loop(&backend);

        let updates = sync
            .handle(SyncCommand::Lookup {
                name: "prod".to_string(),
            })
            .await;
        match updates.as_slice() {
            [UiUpdate::Found { name, environments }] => {
                assert_eq!(name, "prod");
                assert_eq!(environments.len(), 1);
            }
            other => panic!("unexpected updates: {other:?}"),
        }
        assert!(sync.view().is_empty());
    }

    #[tokio::test]
    async fn test_run_serializes_commands_and_settles() {
        let backend = MockApi::new();
        backend.seed("dev", &[]);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (update_tx, mut update_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(sync_loop(&backend).run(cmd_rx, update_tx));

        cmd_tx.send(SyncCommand::Reload).unwrap();
        cmd_tx
            .send(SyncCommand::AddEnvironment {
                name: "prod".to_string(),
            })
            .unwrap();
        drop(cmd_tx);

        let mut updates = Vec::new();
        while let Some(update) = update_rx.recv().await {
            updates.push(update);
        }
        task.await.unwrap();

        let settled = updates
            .iter()
            .filter(|u| matches!(u, UiUpdate::Settled))
            .count();
        assert_eq!(settled, 2);
        assert_eq!(updates.last(), Some(&UiUpdate::Settled));
        let names: Vec<_> = last_view(&updates)
            .environments
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["dev", "prod"]);
    }

    #[tokio::test]
    async fn test_run_hides_row_while_delete_is_in_flight() {
        let backend = MockApi::new();
        backend.seed("dev", &[]);
        backend.seed("prod", &[]);
        let mut sync = sync_loop(&backend);
        sync.handle(SyncCommand::Reload).await;
        let row = sync.view().find("dev").unwrap().row;

        let (entered, release) = backend.gate_deletes();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (update_tx, mut update_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(sync.run(cmd_rx, update_tx));

        cmd_tx.send(SyncCommand::DeleteEnvironment { row }).unwrap();
        entered.notified().await;

        let UiUpdate::Render(view) = update_rx.recv().await.unwrap() else {
            panic!("expected a render while the delete is in flight");
        };
        assert!(view.find("dev").is_none());
        assert!(view.find("prod").is_some());

        release.notify_one();
        drop(cmd_tx);
        let mut rest = Vec::new();
        while let Some(update) = update_rx.recv().await {
            rest.push(update);
        }
        task.await.unwrap();

        assert_eq!(
            notification(&rest),
            Notification::success("Environment deleted")
        );
        assert_eq!(backend.environments().len(), 1);
    }
}
