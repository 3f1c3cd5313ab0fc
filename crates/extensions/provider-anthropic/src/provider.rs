//! Anthropic provider implementation.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use deskpilot_protocols::action::{parse_action_text, Action, ActionValidator};
use deskpilot_protocols::error::ProviderError;
use deskpilot_protocols::provider::{
    ActionProvider, PlanningContext, ProviderDescriptor, ProviderStatus, SYSTEM_PROMPT,
};

use crate::api::{error_message, ApiRequest, ApiResponse};
use crate::converter::build_messages;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const API_VERSION: &str = "2023-06-01";
const TEMPERATURE: f32 = 0.1;

const VALIDATOR: ActionValidator = ActionValidator::new(0.85);

/// Direct Anthropic provider.
pub struct AnthropicProvider {
    descriptor: ProviderDescriptor,
    api_key: RwLock<Option<String>>,
    base_url: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new() -> Self {
        Self {
            descriptor: ProviderDescriptor::new("anthropic", "Anthropic Claude")
                .with_credential()
                .with_context_window(200_000),
            api_key: RwLock::new(None),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, context: &PlanningContext) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages: build_messages(context),
            system: SYSTEM_PROMPT.to_string(),
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
        }
    }

    async fn send_request(
        &self,
        api_key: &str,
        api_request: &ApiRequest,
    ) -> Result<ApiResponse, ProviderError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .timeout(self.timeout)
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, "Anthropic request failed");
            return Err(map_status(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(e.to_string()))
    }
}

impl Default for AnthropicProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn map_status(status: u16, body: &str) -> ProviderError {
    match status {
        401 => ProviderError::backend(status, "Invalid Anthropic API key. Update via Settings."),
        429 => ProviderError::backend(status, "Anthropic rate limit exceeded. Try again later."),
        _ => ProviderError::backend(status, error_message(body)),
    }
}

#[async_trait]
impl ActionProvider for AnthropicProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn status(&self) -> ProviderStatus {
        let configured = self.api_key.read().is_some();
        ProviderStatus::new(configured, configured)
    }

    fn set_credential(&self, secret: String) {
        *self.api_key.write() = Some(secret);
    }

    fn clear_credential(&self) {
        *self.api_key.write() = None;
    }

    async fn get_actions(&self, context: &PlanningContext) -> Result<Vec<Action>, ProviderError> {
        let api_key = self.api_key.read().clone().ok_or_else(|| {
            ProviderError::not_configured("Anthropic API key not configured. Add via Settings.")
        })?;

        debug!(
            model = %self.model,
            history = context.history.len(),
            "Requesting actions from Anthropic"
        );
        let response = self
            .send_request(&api_key, &self.build_request(context))
            .await?;
        let text = response
            .first_text()
            .ok_or_else(|| ProviderError::malformed("Anthropic returned no text content"))?;
        let raw = parse_action_text(text)?;
        Ok(VALIDATOR.validate_batch(&raw)?)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
