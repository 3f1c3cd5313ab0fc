//! UI action schema.
//!
//! Every provider returns raw JSON; nothing reaches a caller until it has
//! passed through [`ActionValidator`].

mod parse;
mod types;
mod validator;

pub use parse::*;
pub use types::*;
pub use validator::*;
