//! File-based storage for `.env` and export files.

mod dotenv_file;
mod file_system;

pub use dotenv_file::DotenvFile;
pub use file_system::{FileError, write_text};
