//! Environment-related use cases

mod delete_environment;
mod delete_variable;
mod list_environments;
mod save_environment;

pub use delete_environment::DeleteEnvironment;
pub use delete_variable::DeleteVariable;
pub use list_environments::ListEnvironments;
pub use save_environment::{SaveEnvironment, SaveOutcome};
