//! HTTP wire types.
//!
//! This module provides the response envelope and the DTOs of the
//! environment resource.

mod envelope;

pub use envelope::{EnvironmentDto, ListEnvelope, ResponseEnvelope, ValueDto};
