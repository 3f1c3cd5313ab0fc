//! Action provider trait definition.

use async_trait::async_trait;

use super::{PlanningContext, ProviderDescriptor, ProviderStatus};
use crate::action::Action;
use crate::error::ProviderError;

/// Core trait for action providers.
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Static description of this provider.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Returns the provider ID.
    fn id(&self) -> &str {
        &self.descriptor().id
    }

    /// Compute whether the provider is configured and reachable right now.
    async fn status(&self) -> ProviderStatus;

    /// Hand the provider a decrypted secret. Only meaningful for providers
    /// whose descriptor sets `requires_credential`.
    fn set_credential(&self, secret: String) {
        let _ = secret;
    }

    /// Forget any secret held in memory.
    fn clear_credential(&self) {}

    /// Plan actions for the request in `context`.
    ///
    /// On success every returned action has been validated.
    async fn get_actions(&self, context: &PlanningContext) -> Result<Vec<Action>, ProviderError>;
}
