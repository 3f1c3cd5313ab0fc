//! Cloud proxy provider for deskpilot.
//!
//! The backend holds the vendor keys; this side only forwards the request
//! and validates what comes back.

mod api;
mod provider;

pub use provider::{BackendProxyProvider, Vendor};
