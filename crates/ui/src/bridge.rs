//! UI Bridge Module
//!
//! Defines the communication protocol between a frontend and the
//! synchronization loop running on the Tokio runtime.

use secretly_domain::{Environment, RowKey};

use crate::notification::Notification;
use crate::render::View;

/// Commands sent from a frontend to the synchronization loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Refetch the whole collection.
    Reload,

    /// Look up environments by name without touching the mirror.
    Lookup { name: String },

    /// Append a new unsaved environment.
    AddEnvironment { name: String },

    /// Rename an environment draft.
    RenameEnvironment { row: RowKey, name: String },

    /// Append an empty variable row.
    AddVariableRow { row: RowKey },

    /// Overwrite one variable row.
    EditVariable {
        row: RowKey,
        variable: RowKey,
        key: String,
        value: String,
    },

    /// Set a variable by key, adding a row if needed.
    SetVariable {
        row: RowKey,
        key: String,
        value: String,
    },

    /// Drop a variable row from a draft.
    RemoveVariableRow { row: RowKey, variable: RowKey },

    /// Create or update an environment.
    Save { row: RowKey },

    /// Delete an environment.
    DeleteEnvironment { row: RowKey },

    /// Delete one variable.
    DeleteVariable { row: RowKey, variable: RowKey },

    /// Show or mask the values of an environment.
    ToggleReveal { row: RowKey },
}

/// Updates sent from the synchronization loop to a frontend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Replace the displayed list.
    Render(View),

    /// Show a toast.
    Notify(Notification),

    /// A new environment row was added.
    EnvironmentAdded { row: RowKey },

    /// A variable row was added or updated.
    VariableAdded { row: RowKey, variable: RowKey },

    /// Result of a `Lookup`.
    Found {
        name: String,
        environments: Vec<Environment>,
    },

    /// The current command is done; the loop waits for the next one.
    Settled,
}
