//! Error types for the deskpilot protocol layer.

mod action;
mod channel;
mod provider;
mod store;

pub use action::*;
pub use channel::*;
pub use provider::*;
pub use store::*;
