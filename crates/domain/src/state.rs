//! Row lifecycle state for UI binding.
//!
//! Every environment row in the local mirror moves through:
//! - `Unsaved -> Saving -> Saved` on first create
//! - `Saved -> Saving -> Saved` on update
//! - `Saved -> Deleting -> Removed` on delete
//!
//! There is no error state. A failed operation puts the row back in the
//! state it had before the operation started.

use crate::environment::Environment;
use crate::id::RowKey;

/// Lifecycle state of an environment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowState {
    /// Created locally, never persisted.
    #[default]
    Unsaved,
    /// Create or update request in flight.
    Saving,
    /// Matches the last successful fetch.
    Saved,
    /// Delete request in flight. Hidden from the render.
    Deleting,
    /// Deleted on the backend; dropped at the next reload.
    Removed,
}

impl RowState {
    /// Returns true if the row should be shown.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Deleting | Self::Removed)
    }

    /// Short label for display.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unsaved => "unsaved",
            Self::Saving => "saving",
            Self::Saved => "saved",
            Self::Deleting => "deleting",
            Self::Removed => "removed",
        }
    }
}

/// One environment in the local mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentRow {
    /// Client-local key.
    pub key: RowKey,
    /// Current draft contents.
    pub environment: Environment,
    /// Lifecycle state.
    pub state: RowState,
}

impl EnvironmentRow {
    /// Wraps an environment fetched from the backend.
    #[must_use]
    pub fn saved(environment: Environment) -> Self {
        Self {
            key: RowKey::generate(),
            environment,
            state: RowState::Saved,
        }
    }

    /// Wraps a locally created environment.
    #[must_use]
    pub fn unsaved(environment: Environment) -> Self {
        Self {
            key: RowKey::generate(),
            environment,
            state: RowState::Unsaved,
        }
    }
}
