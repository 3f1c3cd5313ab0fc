//! Encrypted credential persistence.

use deskpilot_protocols::KeyValueStore;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::VaultError;
use crate::vault::Vault;

/// Durable key under which a provider's encrypted credential lives.
pub fn credential_key(provider_id: &str) -> String {
    format!("credential.{}", provider_id)
}

/// Vault plus key-value store: the only path by which secrets reach disk.
#[derive(Clone)]
pub struct CredentialStore {
    vault: Arc<Vault>,
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(vault: Arc<Vault>, store: Arc<dyn KeyValueStore>) -> Self {
        Self { vault, store }
    }

    pub async fn store(&self, provider_id: &str, secret: &str) -> Result<(), VaultError> {
        let blob = self.vault.encrypt(secret).await?;
        self.store.set(&credential_key(provider_id), &blob).await?;
        info!("Stored credential for provider {}", provider_id);
        Ok(())
    }

    /// `Ok(None)` when nothing is stored; `Err(Decrypt)` when something is
    /// stored but cannot be read back.
    pub async fn load(&self, provider_id: &str) -> Result<Option<String>, VaultError> {
        let Some(blob) = self.store.get(&credential_key(provider_id)).await? else {
            debug!("No stored credential for provider {}", provider_id);
            return Ok(None);
        };
        self.vault.decrypt(&blob).await.map(Some)
    }

    pub async fn delete(&self, provider_id: &str) -> Result<(), VaultError> {
        self.store.remove(&credential_key(provider_id)).await?;
        info!("Deleted credential for provider {}", provider_id);
        Ok(())
    }

    pub async fn has(&self, provider_id: &str) -> Result<bool, VaultError> {
        Ok(self.store.get(&credential_key(provider_id)).await?.is_some())
    }
}
