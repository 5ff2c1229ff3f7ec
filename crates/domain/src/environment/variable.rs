//! Environment and variable types

use crate::id::{EnvironmentId, RowKey, VariableId};

use super::payload::{EnvironmentPayload, VariablePayload};

/// Mask shown in place of a secret value.
pub const SECRET_MASK: &str = "••••••••";

/// A single key/value configuration entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    /// Client-local row key.
    pub row: RowKey,
    /// Backend identifier. `None` until the owning environment is saved.
    pub id: Option<VariableId>,
    /// Variable name.
    pub key: String,
    /// Variable value. May be empty.
    pub value: String,
}

impl Variable {
    /// Creates a new, never persisted variable.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            row: RowKey::generate(),
            id: None,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a variable as read back from the backend.
    #[must_use]
    pub fn persisted(id: VariableId, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(key, value)
        }
    }

    /// Creates an empty row, as added by the "add variable" action.
    #[must_use]
    pub fn blank() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Returns true if the variable has been saved at least once.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns true if the key is empty or whitespace only.
    ///
    /// Such rows are never sent to the backend.
    #[must_use]
    pub fn has_blank_key(&self) -> bool {
        self.key.trim().is_empty()
    }

    /// Returns the value with its content hidden.
    #[must_use]
    pub fn masked_value(&self) -> &str {
        if self.value.is_empty() { "" } else { SECRET_MASK }
    }
}

/// A named group of configuration variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Backend identifier. `None` until first save.
    pub id: Option<EnvironmentId>,
    /// Environment name (e.g. "dev", "production").
    pub name: String,
    /// Variables in display order.
    pub variables: Vec<Variable>,
}

impl Environment {
    /// Creates a new unsaved environment with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            variables: Vec::new(),
        }
    }

    /// Creates an environment as read back from the backend.
    #[must_use]
    pub fn persisted(id: EnvironmentId, name: impl Into<String>, variables: Vec<Variable>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            variables,
        }
    }

    /// Returns true if the environment has been saved at least once.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Appends an empty variable row and returns its key.
    pub fn add_variable_row(&mut self) -> RowKey {
        let variable = Variable::blank();
        let row = variable.row;
        self.variables.push(variable);
        row
    }

    /// Appends a variable and returns its row key.
    pub fn push_variable(&mut self, key: impl Into<String>, value: impl Into<String>) -> RowKey {
        let variable = Variable::new(key, value);
        let row = variable.row;
        self.variables.push(variable);
        row
    }

    /// Sets `key` to `value`, updating the first row with that key or
    /// appending a new one.
    pub fn set_variable(&mut self, key: &str, value: impl Into<String>) -> RowKey {
        let key = key.trim();
        if let Some(existing) = self.variables.iter_mut().find(|v| v.key.trim() == key) {
            existing.value = value.into();
            return existing.row;
        }
        self.push_variable(key, value)
    }

    /// Removes a variable row, returning its former index and contents.
    pub fn remove_variable_row(&mut self, row: RowKey) -> Option<(usize, Variable)> {
        let index = self.variables.iter().position(|v| v.row == row)?;
        Some((index, self.variables.remove(index)))
    }

    /// Puts a previously removed variable back at `index` (clamped).
    pub fn restore_variable(&mut self, index: usize, variable: Variable) {
        let index = index.min(self.variables.len());
        self.variables.insert(index, variable);
    }

    /// Gets a variable row.
    #[must_use]
    pub fn variable(&self, row: RowKey) -> Option<&Variable> {
        self.variables.iter().find(|v| v.row == row)
    }

    /// Gets a mutable variable row.
    pub fn variable_mut(&mut self, row: RowKey) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.row == row)
    }

    /// Finds the first variable whose trimmed key equals `key`.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<&Variable> {
        let key = key.trim();
        self.variables.iter().find(|v| v.key.trim() == key)
    }

    /// Returns the number of variables in this environment.
    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Builds the body sent on create or update.
    ///
    /// Keys are trimmed and rows with a blank key are dropped. Values are
    /// sent verbatim.
    #[must_use]
    pub fn to_payload(&self) -> EnvironmentPayload {
        EnvironmentPayload {
            name: self.name.clone(),
            values: self
                .variables
                .iter()
                .filter(|v| !v.has_blank_key())
                .map(|v| VariablePayload {
                    id: v.id,
                    key: v.key.trim().to_string(),
                    value: v.value.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_environment_new_is_unsaved() {
        let env = Environment::new("dev");
        assert_eq!(env.name, "dev");
        assert!(!env.is_persisted());
        assert!(env.variables.is_empty());
    }

    #[test]
    fn test_add_and_remove_variable_row() {
        let mut env = Environment::new("dev");
        let first = env.push_variable("A", "1");
        let blank = env.add_variable_row();
        assert_eq!(env.variable_count(), 2);
        assert!(env.variable(blank).expect("row exists").has_blank_key());

        let (index, removed) = env.remove_variable_row(first).expect("row exists");
        assert_eq!(index, 0);
        assert_eq!(removed.key, "A");
        assert_eq!(env.variable_count(), 1);
        assert!(env.remove_variable_row(first).is_none());
    }

    #[test]
    fn test_restore_variable_keeps_position() {
        let mut env = Environment::new("dev");
        env.push_variable("A", "1");
        let middle = env.push_variable("B", "2");
        env.push_variable("C", "3");

        let (index, removed) = env.remove_variable_row(middle).unwrap();
        env.restore_variable(index, removed);

        let keys: Vec<_> = env.variables.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_set_variable_updates_existing_key() {
        let mut env = Environment::new("dev");
        let row = env.push_variable("PORT", "8080");
        let again = env.set_variable("PORT", "9090");
        assert_eq!(row, again);
        assert_eq!(env.find_by_key("PORT").unwrap().value, "9090");

        env.set_variable("HOST", "localhost");
        assert_eq!(env.variable_count(), 2);
    }

    #[test]
    fn test_payload_filters_blank_keys() {
        let mut env = Environment::new("dev");
        env.push_variable("PORT", "8080");
        env.push_variable("   ", "ignored");
        env.add_variable_row();
        env.push_variable("  HOST ", " spaced ");

        let payload = env.to_payload();
        assert_eq!(payload.values.len(), 2);
        assert_eq!(payload.values[0].key, "PORT");
        assert_eq!(payload.values[1].key, "HOST");
        assert_eq!(payload.values[1].value, " spaced ");
    }

    #[test]
    fn test_payload_keeps_variable_ids() {
        let env = Environment::persisted(
            EnvironmentId(1),
            "prod",
            vec![Variable::persisted(VariableId(10), "A", "1")],
        );
        let payload = env.to_payload();
        assert_eq!(payload.values[0].id, Some(VariableId(10)));
    }

    #[test]
    fn test_masked_value() {
        assert_eq!(Variable::new("TOKEN", "s3cr3t").masked_value(), SECRET_MASK);
        assert_eq!(Variable::new("EMPTY", "").masked_value(), "");
    }
}
