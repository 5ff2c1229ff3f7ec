//! Identifier types.
//!
//! Server identifiers are 64-bit row ids allocated by the backend. Every row
//! in the local mirror also carries a [`RowKey`], generated client-side, so
//! that drafts can be addressed before the backend has assigned an id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Backend-assigned identifier of an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentId(pub i64);

/// Backend-assigned identifier of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub i64);

impl fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Client-local key of a row in the mirror. Never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(Uuid);

impl RowKey {
    /// Generates a fresh key.
    ///
    /// UUID v7 keys sort by creation time, so keys issued during one reload
    /// keep the order the rows were received in.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_key_uniqueness() {
        let a = RowKey::generate();
        let b = RowKey::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_ids_serialize_as_numbers() {
        let json = serde_json::to_string(&EnvironmentId(3)).unwrap();
        assert_eq!(json, "3");
        assert_eq!(VariableId(7).to_string(), "7");
    }
}
