//! JSON encoding and decoding.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Errors raised while converting to or from JSON.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// A value could not be encoded.
    #[error("cannot encode JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Input could not be decoded into the expected type.
    #[error("cannot decode JSON: {0}")]
    Deserialize(serde_json::Error),

    /// Encoded output was not valid UTF-8.
    #[error("encoded JSON is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encodes `value` as pretty JSON with a two-space indent and a final
/// newline, so exported files diff cleanly.
///
/// # Errors
///
/// Returns an error if `value` cannot be encoded.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut out = Vec::with_capacity(128);
    value.serialize(&mut Serializer::with_formatter(
        &mut out,
        PrettyFormatter::with_indent(b"  "),
    ))?;

    let mut text = String::from_utf8(out)?;
    text.push('\n');
    Ok(text)
}

/// Decodes a JSON string.
///
/// # Errors
///
/// Returns an error if `json` does not decode into `T`.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T, SerializationError> {
    serde_json::from_str(json).map_err(SerializationError::Deserialize)
}

/// Decodes a response body.
///
/// # Errors
///
/// Returns an error if `bytes` do not decode into `T`.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}
