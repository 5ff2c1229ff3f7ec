//! JSON helpers shared by the HTTP adapter and export.

mod json;

pub use json::{SerializationError, from_json, from_json_bytes, to_json_stable};
