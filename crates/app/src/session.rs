//! A synchronization loop running on its own task.
//!
//! The CLI talks to the loop the way a graphical frontend would: it sends
//! [`SyncCommand`]s and collects [`UiUpdate`]s until the loop reports the
//! command as settled.

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use secretly_application::{EnvironmentApi, SyncClient};
use secretly_domain::{Environment, RowKey};
use secretly_ui::{Notification, SyncCommand, SyncLoop, UiUpdate, View};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What one command produced.
#[derive(Debug, Default)]
pub struct Outcome {
    /// Last render, if any.
    pub view: Option<View>,
    /// Notifications, in order.
    pub notifications: Vec<Notification>,
    /// Row added by `AddEnvironment`.
    pub environment: Option<RowKey>,
    /// Result of a `Lookup`.
    pub found: Option<Vec<Environment>>,
}

impl Outcome {
    /// Fails with the first error notification, if any.
    ///
    /// # Errors
    /// Returns the notification text as an error.
    pub fn checked(self) -> Result<Self> {
        if let Some(error) = self.notifications.iter().find(|n| n.is_error()) {
            bail!("{error}");
        }
        Ok(self)
    }

    /// Success notifications, one per line.
    #[must_use]
    pub fn messages(&self) -> String {
        self.notifications
            .iter()
            .filter(|n| !n.is_error())
            .map(|n| format!("{n}\n"))
            .collect()
    }

    /// Returns the last render.
    ///
    /// # Errors
    /// Returns an error if the command rendered nothing.
    pub fn into_view(self) -> Result<View> {
        self.view.context("no view was rendered")
    }
}

/// Handle to a running loop.
pub struct Session {
    commands: mpsc::UnboundedSender<SyncCommand>,
    updates: mpsc::UnboundedReceiver<UiUpdate>,
    task: JoinHandle<()>,
}

impl Session {
    /// Spawns a loop over `api`.
    pub fn start<A: EnvironmentApi + 'static>(api: Arc<A>) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (update_tx, updates) = mpsc::unbounded_channel();
        let sync_loop = SyncLoop::new(SyncClient::new(api));
        let task = tokio::spawn(sync_loop.run(command_rx, update_tx));
        Self {
            commands,
            updates,
            task,
        }
    }

    /// Sends one command and waits until it has settled.
    ///
    /// # Errors
    /// Returns an error if the loop has stopped.
    pub async fn dispatch(&mut self, cmd: SyncCommand) -> Result<Outcome> {
        self.commands
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("synchronization loop stopped"))?;

        let mut outcome = Outcome::default();
        loop {
            match self.updates.recv().await {
                Some(UiUpdate::Settled) => return Ok(outcome),
                Some(UiUpdate::Render(view)) => outcome.view = Some(view),
                Some(UiUpdate::Notify(notification)) => outcome.notifications.push(notification),
                Some(UiUpdate::EnvironmentAdded { row }) => outcome.environment = Some(row),
                Some(UiUpdate::VariableAdded { .. }) => {}
                Some(UiUpdate::Found { environments, .. }) => outcome.found = Some(environments),
                None => bail!("synchronization loop stopped"),
            }
        }
    }

    /// Sends one command and fails on any error notification.
    ///
    /// # Errors
    /// Returns an error if the loop has stopped or the command failed.
    pub async fn dispatch_checked(&mut self, cmd: SyncCommand) -> Result<Outcome> {
        self.dispatch(cmd).await?.checked()
    }

    /// Closes the command channel and waits for the loop to finish.
    ///
    /// # Errors
    /// Returns an error if the loop task panicked.
    pub async fn close(self) -> Result<()> {
        drop(self.commands);
        self.task.await.context("synchronization loop failed")
    }
}
