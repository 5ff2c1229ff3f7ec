//! Pure rendering of the mirror into a view model.
//!
//! `render` takes an immutable snapshot and produces a description of what
//! a frontend should show. It has no side effects and holds no state.

use std::collections::HashSet;
use std::fmt;

use secretly_domain::{Environment, EnvironmentId, EnvironmentRow, RowKey, RowState, VariableId};

/// Environments whose values are shown in clear text.
///
/// Saved environments are tracked by backend id so the choice survives a
/// reload, which hands out fresh row keys. Drafts are tracked by row key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealSet {
    saved: HashSet<EnvironmentId>,
    drafts: HashSet<RowKey>,
}

impl RevealSet {
    /// Creates an empty set; every value is masked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the reveal flag of `row`. Returns the new flag.
    pub fn toggle(&mut self, row: &EnvironmentRow) -> bool {
        let revealed = !self.is_revealed(row);
        match row.environment.id {
            Some(id) if revealed => {
                self.saved.insert(id);
            }
            Some(id) => {
                self.saved.remove(&id);
            }
            None if revealed => {
                self.drafts.insert(row.key);
            }
            None => {
                self.drafts.remove(&row.key);
            }
        }
        revealed
    }

    /// Returns true if the values of `row` are shown.
    #[must_use]
    pub fn is_revealed(&self, row: &EnvironmentRow) -> bool {
        match row.environment.id {
            Some(id) => self.saved.contains(&id),
            None => self.drafts.contains(&row.key),
        }
    }
}

/// Everything a frontend shows for the environment list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    /// Visible environments, in mirror order.
    pub environments: Vec<EnvironmentView>,
}

impl View {
    /// Finds the first visible environment with the given name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&EnvironmentView> {
        self.environments.iter().find(|e| e.name == name)
    }

    /// Returns true if nothing is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }
}

/// One environment as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentView {
    /// Row key, used to address commands at this environment.
    pub row: RowKey,
    /// Backend id, if saved.
    pub id: Option<EnvironmentId>,
    /// Name.
    pub name: String,
    /// Lifecycle state.
    pub state: RowState,
    /// Whether values are shown in clear text.
    pub revealed: bool,
    /// Variables, in display order.
    pub variables: Vec<VariableView>,
}

impl EnvironmentView {
    /// Finds a variable by trimmed key.
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&VariableView> {
        let key = key.trim();
        self.variables.iter().find(|v| v.key.trim() == key)
    }
}

/// One variable as displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableView {
    /// Row key of the variable.
    pub row: RowKey,
    /// Backend id, if saved.
    pub id: Option<VariableId>,
    /// Key.
    pub key: String,
    /// Value, masked unless the environment is revealed.
    pub value: String,
}

/// Renders the visible rows of a snapshot.
///
/// Rows that are being deleted, or already deleted and awaiting the
/// reload, are left out.
#[must_use]
pub fn render(rows: &[EnvironmentRow], revealed: &RevealSet) -> View {
    View {
        environments: rows
            .iter()
            .filter(|row| row.state.is_visible())
            .map(|row| {
                let reveal = revealed.is_revealed(row);
                EnvironmentView {
                    state: row.state,
                    ..render_environment(row.key, &row.environment, reveal)
                }
            })
            .collect(),
    }
}

/// Renders a single environment outside of the mirror, as returned by a
/// name lookup.
#[must_use]
pub fn render_environment(row: RowKey, environment: &Environment, reveal: bool) -> EnvironmentView {
    EnvironmentView {
        row,
        id: environment.id,
        name: environment.name.clone(),
        state: if environment.is_persisted() {
            RowState::Saved
        } else {
            RowState::Unsaved
        },
        revealed: reveal,
        variables: environment
            .variables
            .iter()
            .map(|v| VariableView {
                row: v.row,
                id: v.id,
                key: v.key.clone(),
                value: if reveal {
                    v.value.clone()
                } else {
                    v.masked_value().to_string()
                },
            })
            .collect(),
    }
}

impl fmt::Display for EnvironmentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} (#{id})", self.name)?,
            None => write!(f, "{} [{}]", self.name, self.state.label())?,
        }
        for variable in &self.variables {
            write!(f, "\n  {}={}", variable.key, variable.value)?;
        }
        Ok(())
    }
}
