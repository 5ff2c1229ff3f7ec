//! `.env` text format.
//!
//! Blank lines and `#` comments are ignored, each remaining line is split on
//! its first `=`, and both halves are trimmed. Lines without `=` or with an
//! empty key are skipped.

use crate::error::{DomainError, DomainResult};

use super::Environment;

/// Parses `.env` content into ordered key/value pairs.
#[must_use]
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Renders an environment as `.env` content, one `KEY=VALUE` per line.
///
/// Rows with a blank key are left out.
#[must_use]
pub fn to_dotenv(environment: &Environment) -> String {
    environment
        .variables
        .iter()
        .filter(|v| !v.has_blank_key())
        .map(|v| format!("{}={}\n", v.key.trim(), v.value))
        .collect()
}

/// Parses a single `KEY=VALUE` assignment given on the command line.
///
/// # Errors
///
/// Returns `DomainError::InvalidAssignment` if there is no `=` or the key
/// is blank.
pub fn parse_assignment(input: &str) -> DomainResult<(String, String)> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| DomainError::InvalidAssignment(input.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(DomainError::InvalidAssignment(input.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}
