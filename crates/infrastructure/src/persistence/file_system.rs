//! Text file access through `tokio::fs`.

use std::path::{Path, PathBuf};

use tokio::fs;

/// Error raised while reading or writing a file.
#[derive(Debug, thiserror::Error)]
#[error("I/O error on {}: {source}", .path.display())]
pub struct FileError {
    /// The file involved.
    pub path: PathBuf,
    /// The underlying error.
    #[source]
    pub source: std::io::Error,
}

impl FileError {
    fn new(path: &Path, source: std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Reads a whole UTF-8 file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub(crate) async fn read_text(path: &Path) -> Result<String, FileError> {
    fs::read_to_string(path)
        .await
        .map_err(|e| FileError::new(path, e))
}

/// Writes `contents` to `path`, creating missing parent directories.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
pub async fn write_text(path: &Path, contents: &str) -> Result<(), FileError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| FileError::new(parent, e))?;
    }
    fs::write(path, contents)
        .await
        .map_err(|e| FileError::new(path, e))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}
