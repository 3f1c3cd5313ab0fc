//! # deskpilot Protocols
//!
//! Core protocol definitions for deskpilot. Contains the action schema and its
//! validator plus the interfaces every other crate implements.
//!
//! ## Core Traits
//!
//! - [`ActionProvider`] - Trait for planning backends that turn a request into actions
//! - [`KeyValueStore`] - Durable preference/credential storage port

pub mod action;
pub mod error;
pub mod provider;
pub mod store;
pub mod types;

pub use action::{Action, ActionKind, ActionParams, ActionValidator, MouseButton};
pub use provider::{ActionProvider, PlanningContext, ProviderDescriptor, ProviderStatus};
pub use store::KeyValueStore;
pub use error::{ActionError, ChannelError, ProviderError, StoreError};
pub use types::*;
