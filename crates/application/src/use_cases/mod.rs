//! Application use cases (business logic orchestration).

pub mod environment;

pub use environment::{
    DeleteEnvironment, DeleteVariable, ListEnvironments, SaveEnvironment, SaveOutcome,
};
