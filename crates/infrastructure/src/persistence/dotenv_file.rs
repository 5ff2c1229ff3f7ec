//! `.env` file reader and writer.

use std::path::PathBuf;

use secretly_domain::{Environment, parse_dotenv, to_dotenv};

use super::file_system::{FileError, read_text, write_text};

/// A `.env` file on disk.
#[derive(Debug, Clone)]
pub struct DotenvFile {
    path: PathBuf,
}

impl DotenvFile {
    /// Creates a handle for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads and parses the file into ordered key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn load(&self) -> Result<Vec<(String, String)>, FileError> {
        let pairs = parse_dotenv(&read_text(&self.path).await?);
        tracing::debug!(path = %self.path.display(), count = pairs.len(), "read dotenv file");
        Ok(pairs)
    }

    /// Writes `environment` as `.env` content, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, environment: &Environment) -> Result<(), FileError> {
        write_text(&self.path, &to_dotenv(environment)).await
    }
}
