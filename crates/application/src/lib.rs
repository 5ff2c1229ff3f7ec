//! Secretly Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for the backend)
//! - Use case orchestration
//! - The optimistic-reload `SyncClient`
//! - Application-level error handling

pub mod error;
pub mod ports;
pub mod sync_client;
pub mod use_cases;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{ApplicationError, ApplicationResult};
pub use ports::{ApiError, EnvironmentApi};
pub use sync_client::{Snapshot, SyncClient};
pub use use_cases::{
    DeleteEnvironment, DeleteVariable, ListEnvironments, SaveEnvironment, SaveOutcome,
};
