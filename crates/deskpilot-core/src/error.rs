//! Registry errors.

use deskpilot_protocols::{ProviderError, StoreError};
use deskpilot_vault::VaultError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("No active provider. Choose one with `deskpilot use <id>`.")]
    NoActiveProvider,

    #[error("Provider not found: {0}")]
    NotFound(String),

    #[error("Provider already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Provider {0} does not take a credential")]
    CredentialNotRequired(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
