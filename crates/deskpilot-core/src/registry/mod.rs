//! Provider registry.

mod provider;

pub use provider::{ACTIVE_PROVIDER_KEY, ProviderEntry, ProviderRegistry};
