//! Credential vault for deskpilot.
//!
//! Provider API keys are encrypted with a key derived from a
//! per-installation fingerprint and stored through a [`KeyValueStore`].
//! This is obfuscation at rest, not protection against code running as
//! the same user.

mod credentials;
mod error;
mod fingerprint;
mod vault;

pub mod store;

pub use credentials::{CredentialStore, credential_key};
pub use error::VaultError;
pub use fingerprint::Fingerprint;
pub use store::{FileStore, MemoryStore};
pub use vault::{MIN_ITERATIONS, Vault};

pub use deskpilot_protocols::KeyValueStore;
