//! Wire format of the `/api/v1/env` resource.
//!
//! Every response is wrapped in the v1 envelope:
//!
//! ```json
//! { "data": ..., "code": 200, "message": "Environments retrieved", "error": "" }
//! ```
//!
//! The list response must carry a `data` list. A legacy flat `KEY: value`
//! map has no `data` key and is rejected rather than read as empty, and so
//! is `data: null`, which the backend only sends alongside a failure.
//!
//! The backend may report a failure with HTTP 200 and the real status in
//! the envelope: `{"data": null, "code": 500, "error": "..."}`.

use serde::{Deserialize, Deserializer};

use secretly_domain::{Environment, EnvironmentId, Variable, VariableId};

/// Body of `GET /env`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope {
    /// The environments.
    pub data: Vec<EnvironmentDto>,
    /// Status code echoed by the backend.
    pub code: Option<i64>,
    /// Human-readable status message.
    pub message: Option<String>,
}

/// Envelope of mutation and error responses. `data` is kept loose because
/// only the id of a created environment is ever read from it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseEnvelope {
    /// Payload, if any.
    pub data: Option<serde_json::Value>,
    /// Status code echoed by the backend.
    pub code: Option<i64>,
    /// Human-readable status message.
    pub message: Option<String>,
    /// Error text. The backend sends `""` on success.
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Returns the error text, treating an empty string as absent.
    #[must_use]
    pub fn error_text(&self) -> Option<String> {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(ToString::to_string)
    }

    /// Returns the failure status this envelope reports, if any.
    ///
    /// A `code` outside `2xx` is a failure with that status. A non-empty
    /// `error` next to a success code (or no code) is a failure with
    /// status 500.
    #[must_use]
    pub fn failure_status(&self) -> Option<u16> {
        match self.code {
            Some(code) if !(200..300).contains(&code) => {
                Some(u16::try_from(code).unwrap_or(500))
            }
            _ => self.error_text().map(|_| 500),
        }
    }

    /// Returns `data.id`, if the payload is an object with an integer id.
    #[must_use]
    pub fn data_id(&self) -> Option<EnvironmentId> {
        self.data
            .as_ref()
            .and_then(|d| d.get("id"))
            .and_then(serde_json::Value::as_i64)
            .map(EnvironmentId)
    }
}

/// One environment as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvironmentDto {
    /// Backend id.
    pub id: i64,
    /// Name.
    pub name: String,
    /// Variables.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub values: Vec<ValueDto>,
}

/// One variable as sent by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValueDto {
    /// Backend id.
    pub id: i64,
    /// Variable name.
    pub key: String,
    /// Variable value.
    #[serde(default)]
    pub value: String,
}

impl From<EnvironmentDto> for Environment {
    fn from(dto: EnvironmentDto) -> Self {
        Self::persisted(
            EnvironmentId(dto.id),
            dto.name,
            dto.values.into_iter().map(Variable::from).collect(),
        )
    }
}

impl From<ValueDto> for Variable {
    fn from(dto: ValueDto) -> Self {
        Self::persisted(VariableId(dto.id), dto.key, dto.value)
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
