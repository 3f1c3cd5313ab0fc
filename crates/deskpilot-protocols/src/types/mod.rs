//! Common types used across deskpilot.

mod message;

pub use message::*;
