//! Rendering environments for export.

use std::fmt;
use std::str::FromStr;

use secretly_domain::{Environment, to_dotenv};

use crate::serialization::{SerializationError, to_json_stable};

/// Output format of `export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// `KEY=VALUE` lines.
    #[default]
    Dotenv,
    /// The save payload as pretty JSON, without ids.
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dotenv => write!(f, "dotenv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dotenv" | "env" => Ok(Self::Dotenv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown export format '{other}'")),
        }
    }
}

/// Renders `environment` in the given format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn export_environment(
    environment: &Environment,
    format: ExportFormat,
) -> Result<String, SerializationError> {
    match format {
        ExportFormat::Dotenv => Ok(to_dotenv(environment)),
        ExportFormat::Json => {
            let mut payload = environment.to_payload();
            for value in &mut payload.values {
                value.id = None;
            }
            to_json_stable(&payload)
        }
    }
}
