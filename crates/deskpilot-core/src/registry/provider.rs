//! Provider registry for managing action providers.

use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use deskpilot_protocols::{
    Action, ActionProvider, KeyValueStore, Message, PlanningContext, ProviderDescriptor,
    ProviderStatus,
};
use deskpilot_vault::CredentialStore;

use crate::error::RegistryError;
use crate::history::ConversationHistory;

/// Durable key holding the user's provider choice.
pub const ACTIVE_PROVIDER_KEY: &str = "active_provider";

/// One row of [`ProviderRegistry::list`].
#[derive(Debug, Clone, Serialize)]
pub struct ProviderEntry {
    #[serde(flatten)]
    pub descriptor: ProviderDescriptor,
    pub status: ProviderStatus,
    pub active: bool,
}

/// Registry for managing action providers.
///
/// Locks guard only short reads and writes; none is held across an
/// `.await`.
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn ActionProvider>>,
    order: RwLock<Vec<String>>,
    active: RwLock<Option<String>>,
    history: Mutex<ConversationHistory>,
    store: Arc<dyn KeyValueStore>,
    credentials: CredentialStore,
}

impl ProviderRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>, credentials: CredentialStore) -> Self {
        Self {
            providers: DashMap::new(),
            order: RwLock::new(Vec::new()),
            active: RwLock::new(None),
            history: Mutex::new(ConversationHistory::new()),
            store,
            credentials,
        }
    }

    /// Register a provider.
    pub fn register(&self, provider: Arc<dyn ActionProvider>) -> Result<(), RegistryError> {
        let id = provider.id().to_string();

        if self.providers.contains_key(&id) {
            return Err(RegistryError::AlreadyRegistered(id));
        }

        debug!("Registered provider {}", id);
        self.order.write().push(id.clone());
        self.providers.insert(id, provider);
        Ok(())
    }

    /// Get a provider by ID.
    pub fn get(&self, id: &str) -> Option<Arc<dyn ActionProvider>> {
        self.providers.get(id).map(|p| p.clone())
    }

    /// Provider IDs in registration order.
    pub fn ids(&self) -> Vec<String> {
        self.order.read().clone()
    }

    pub fn active_id(&self) -> Option<String> {
        self.active.read().clone()
    }

    /// Make `id` the active provider and persist the choice.
    ///
    /// Returns `false` and leaves the selection alone when `id` is not
    /// registered.
    pub async fn set_active(&self, id: &str) -> bool {
        if !self.providers.contains_key(id) {
            warn!("Cannot activate unknown provider {}", id);
            return false;
        }
        *self.active.write() = Some(id.to_string());
        info!("Active provider set to {}", id);

        if let Err(e) = self.store.set(ACTIVE_PROVIDER_KEY, id).await {
            warn!("Failed to persist provider preference: {}", e);
        }
        true
    }

    /// Plan actions with the active provider.
    ///
    /// The provider sees a snapshot of the history. The exchange is recorded
    /// only when planning succeeds.
    pub async fn get_actions(
        &self,
        context: PlanningContext,
    ) -> Result<Vec<Action>, RegistryError> {
        let id = self.active_id().ok_or(RegistryError::NoActiveProvider)?;
        let provider = self
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(id.clone()))?;

        let history = self.history.lock().snapshot();
        let context = context.with_history(history);

        debug!(
            "Planning with {} ({} prior messages)",
            id,
            context.history.len()
        );
        let actions = provider.get_actions(&context).await?;

        self.history
            .lock()
            .push_exchange(&context.user_request, &actions);
        info!("Provider {} planned {} actions", id, actions.len());
        Ok(actions)
    }

    /// Encrypt and store a provider's secret, then hand it to the provider.
    pub async fn configure_credential(&self, id: &str, secret: &str) -> Result<(), RegistryError> {
        let provider = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if !provider.descriptor().requires_credential {
            return Err(RegistryError::CredentialNotRequired(id.to_string()));
        }

        self.credentials.store(id, secret).await?;
        provider.set_credential(secret.to_string());
        Ok(())
    }

    pub async fn remove_credential(&self, id: &str) -> Result<(), RegistryError> {
        let provider = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        if !provider.descriptor().requires_credential {
            return Err(RegistryError::CredentialNotRequired(id.to_string()));
        }

        self.credentials.delete(id).await?;
        provider.clear_credential();
        Ok(())
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    pub fn history(&self) -> Vec<Message> {
        self.history.lock().snapshot()
    }

    /// Descriptor and live status of every provider, in registration order.
    pub async fn list(&self) -> Vec<ProviderEntry> {
        let active = self.active_id();
        let providers: Vec<_> = self.ids().iter().filter_map(|id| self.get(id)).collect();

        let statuses = join_all(providers.iter().map(|p| p.status())).await;

        providers
            .iter()
            .zip(statuses)
            .map(|(provider, status)| ProviderEntry {
                descriptor: provider.descriptor().clone(),
                status,
                active: active.as_deref() == Some(provider.id()),
            })
            .collect()
    }

    /// Restore state saved by a previous run.
    ///
    /// Reactivates the saved provider, falling back to the first registered
    /// one, and loads stored credentials. A credential that fails to decrypt
    /// leaves its provider unconfigured.
    pub async fn restore(&self) -> Option<String> {
        let saved = match self.store.get(ACTIVE_PROVIDER_KEY).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("Failed to read provider preference: {}", e);
                None
            }
        };

        let chosen = saved
            .filter(|id| self.providers.contains_key(id))
            .or_else(|| self.order.read().first().cloned());
        *self.active.write() = chosen.clone();

        for id in self.ids() {
            let Some(provider) = self.get(&id) else {
                continue;
            };
            if !provider.descriptor().requires_credential {
                continue;
            }
            match self.credentials.load(&id).await {
                Ok(Some(secret)) => {
                    provider.set_credential(secret);
                    debug!("Loaded stored credential for {}", id);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Ignoring stored credential for {}: {}", id, e);
                }
            }
        }

        if let Some(id) = &chosen {
            info!("Restored active provider {}", id);
        }
        chosen
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
