//! Backend proxy provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use deskpilot_protocols::action::{extract_actions, Action, ActionValidator};
use deskpilot_protocols::error::ProviderError;
use deskpilot_protocols::provider::{
    ActionProvider, PlanningContext, ProviderDescriptor, ProviderStatus,
};

use crate::api::{ActionsRequest, ActionsResponse, HealthResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Vendor the backend forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    OpenAI,
    Anthropic,
}

impl Vendor {
    /// Name the backend knows the vendor by.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
        }
    }

    fn key_var(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI GPT-4o (via backend)",
            Self::Anthropic => "Anthropic Claude (via backend)",
        }
    }

    fn default_confidence(&self) -> f64 {
        match self {
            Self::OpenAI => 0.8,
            Self::Anthropic => 0.85,
        }
    }

    fn context_window(&self) -> u32 {
        match self {
            Self::OpenAI => 128_000,
            Self::Anthropic => 200_000,
        }
    }
}

/// Forwards planning to the deskpilot backend, which holds the vendor key.
pub struct BackendProxyProvider {
    descriptor: ProviderDescriptor,
    vendor: Vendor,
    base_url: String,
    timeout: Duration,
    validator: ActionValidator,
    client: reqwest::Client,
}

impl BackendProxyProvider {
    pub fn new(vendor: Vendor, base_url: impl Into<String>) -> Self {
        let descriptor = ProviderDescriptor::new(
            format!("backend-{}", vendor.as_str()),
            vendor.display_name(),
        )
        .with_context_window(vendor.context_window());

        Self {
            descriptor,
            vendor,
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            validator: ActionValidator::new(vendor.default_confidence()),
            client: reqwest::Client::new(),
        }
    }

    pub fn openai(base_url: impl Into<String>) -> Self {
        Self::new(Vendor::OpenAI, base_url)
    }

    pub fn anthropic(base_url: impl Into<String>) -> Self {
        Self::new(Vendor::Anthropic, base_url)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn health(&self) -> Result<HealthResponse, ProviderError> {
        let response = self
            .client
            .get(self.url("/api/health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("backend unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::backend(
                status.as_u16(),
                "backend health check failed",
            ));
        }
        response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("invalid health reply: {}", e)))
    }

    fn not_configured(&self) -> ProviderError {
        ProviderError::not_configured(format!(
            "The backend has no {} key. Set {} in the backend environment and restart it.",
            self.vendor.as_str(),
            self.vendor.key_var()
        ))
    }
}

#[async_trait]
impl ActionProvider for BackendProxyProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn status(&self) -> ProviderStatus {
        match self.health().await {
            Ok(health) => ProviderStatus::new(health.has_key(self.vendor.as_str()), true),
            Err(e) => {
                debug!("Backend health check failed: {}", e);
                ProviderStatus::new(false, false)
            }
        }
    }

    async fn get_actions(&self, context: &PlanningContext) -> Result<Vec<Action>, ProviderError> {
        if !self.health().await?.has_key(self.vendor.as_str()) {
            return Err(self.not_configured());
        }

        let body = ActionsRequest {
            provider: self.vendor.as_str(),
            screenshot: &context.screenshot,
            ui_tree: &context.ui_tree,
            user_request: &context.user_request,
        };
        debug!(vendor = self.vendor.as_str(), "Forwarding request to backend");

        let response = self
            .client
            .post(self.url("/api/get-actions"))
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let reply: ActionsResponse = serde_json::from_str(&text).unwrap_or_default();

        if let Some(error) = reply.error {
            warn!(status, "Backend reported an error");
            return Err(ProviderError::backend(status, error));
        }
        if !(200..300).contains(&status) {
            return Err(ProviderError::backend(status, text));
        }

        let actions = match reply.actions {
            Some(actions) if reply.success => actions,
            _ => return Err(ProviderError::malformed("backend reply has no actions")),
        };
        let raw = extract_actions(actions)?;
        Ok(self.validator.validate_batch(&raw)?)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
