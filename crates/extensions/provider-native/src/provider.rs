//! Native host provider implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use deskpilot_channel::ChannelClient;
use deskpilot_protocols::action::{Action, ActionValidator};
use deskpilot_protocols::error::ProviderError;
use deskpilot_protocols::provider::{
    ActionProvider, PlanningContext, ProviderDescriptor, ProviderStatus,
};

const VALIDATOR: ActionValidator = ActionValidator::new(0.7);

/// Hands planning to the native automation host over the request channel.
///
/// The host runs the model with its own stored credentials; this side
/// submits, polls until the request settles and validates the result.
pub struct NativeHostProvider {
    descriptor: ProviderDescriptor,
    client: Arc<ChannelClient>,
    host_provider: String,
}

impl NativeHostProvider {
    /// `host_provider` names the provider the host plans with.
    pub fn new(client: Arc<ChannelClient>, host_provider: impl Into<String>) -> Self {
        Self {
            descriptor: ProviderDescriptor::new("native", "Native host"),
            client,
            host_provider: host_provider.into(),
        }
    }

    pub fn host_provider(&self) -> &str {
        &self.host_provider
    }
}

#[async_trait]
impl ActionProvider for NativeHostProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn status(&self) -> ProviderStatus {
        let available = match self.client.ping().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Native host ping failed: {}", e);
                false
            }
        };
        ProviderStatus::new(true, available)
    }

    async fn get_actions(&self, context: &PlanningContext) -> Result<Vec<Action>, ProviderError> {
        let raw = self
            .client
            .request_actions(&self.host_provider, context)
            .await?;
        debug!(count = raw.len(), "Native host returned actions");
        if raw.is_empty() {
            return Err(ProviderError::malformed("no actions returned"));
        }
        Ok(VALIDATOR.validate_batch(&raw)?)
    }
}
