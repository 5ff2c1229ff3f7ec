//! Secretly Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus file import/export.

pub mod adapters;
pub mod config;
pub mod export;
pub mod http;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestEnvironmentApi;
pub use config::{ClientConfig, ConfigError};
pub use export::{ExportFormat, export_environment};
pub use persistence::{DotenvFile, FileError, write_text};
pub use serialization::{SerializationError, from_json, from_json_bytes, to_json_stable};
