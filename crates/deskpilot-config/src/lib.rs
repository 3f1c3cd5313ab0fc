//! # deskpilot config
//!
//! Configuration management for deskpilot.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{
    ConfigValidator, MIN_VAULT_ITERATIONS, ValidationError, ValidationResult, ValidationWarning,
};
