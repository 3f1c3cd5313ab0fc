//! # deskpilot host
//!
//! The native automation host: answers native-messaging requests on stdio,
//! plans through host-side providers with host-side credentials, and hands
//! screen capture and input to an [`AutomationBackend`].

pub mod backend;
pub mod service;

pub use backend::{AutomationBackend, BackendError, Capabilities, Screenshot, UnsupportedBackend};
pub use service::HostService;
