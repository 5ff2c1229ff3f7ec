//! Environment and variable domain types

mod dotenv;
mod payload;
mod variable;

pub use dotenv::{parse_assignment, parse_dotenv, to_dotenv};
pub use payload::{EnvironmentPayload, VariablePayload};
pub use variable::{Environment, SECRET_MASK, Variable};
