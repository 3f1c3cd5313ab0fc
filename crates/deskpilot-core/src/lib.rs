//! # deskpilot core
//!
//! Provider registry for deskpilot.
//!
//! ## Components
//!
//! - [`ProviderRegistry`] - Registered providers, the active selection,
//!   credentials and the running conversation
//! - [`ConversationHistory`] - Bounded record of prior exchanges

pub mod error;
pub mod history;
pub mod registry;

pub use error::RegistryError;
pub use history::{ConversationHistory, HISTORY_LIMIT};
pub use registry::{ACTIVE_PROVIDER_KEY, ProviderEntry, ProviderRegistry};
