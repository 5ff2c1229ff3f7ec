//! Secretly Domain - Core business types
//!
//! This crate defines the domain model for the Secretly environment client.
//! All types here are pure Rust with no I/O dependencies.

pub mod environment;
pub mod error;
pub mod id;
pub mod state;

pub use environment::{
    Environment, EnvironmentPayload, SECRET_MASK, Variable, VariablePayload, parse_assignment,
    parse_dotenv, to_dotenv,
};
pub use error::{DomainError, DomainResult};
pub use id::{EnvironmentId, RowKey, VariableId};
pub use state::{EnvironmentRow, RowState};
