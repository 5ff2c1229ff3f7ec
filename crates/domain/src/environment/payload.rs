//! Create/update request bodies.

use serde::{Deserialize, Serialize};

use crate::id::VariableId;

/// Body of `POST /env` and `PUT /env/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentPayload {
    /// Environment name.
    pub name: String,
    /// Variables to store.
    pub values: Vec<VariablePayload>,
}

/// One variable inside an [`EnvironmentPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariablePayload {
    /// Present only for variables that already exist on the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<VariableId>,
    /// Variable name.
    pub key: String,
    /// Variable value.
    pub value: String,
}
