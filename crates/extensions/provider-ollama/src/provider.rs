//! Ollama provider implementation.

use std::fmt::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use deskpilot_protocols::action::{parse_action_text, Action, ActionValidator};
use deskpilot_protocols::error::ProviderError;
use deskpilot_protocols::provider::{
    render_request, ActionProvider, PlanningContext, ProviderDescriptor, ProviderStatus,
    SYSTEM_PROMPT,
};
use deskpilot_protocols::types::{Message, MessageRole};

use crate::api::{
    ErrorResponse, GenerateOptions, GenerateRequest, GenerateResponse, TagsResponse,
};
use crate::models::select_model;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const TEMPERATURE: f32 = 0.1;

const VALIDATOR: ActionValidator = ActionValidator::new(0.7);

/// Plans with a vision model on a local Ollama daemon.
pub struct OllamaProvider {
    descriptor: ProviderDescriptor,
    base_url: String,
    model: Option<String>,
    timeout: Duration,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new() -> Self {
        Self {
            descriptor: ProviderDescriptor::new("ollama", "Ollama (Local & Private)")
                .with_context_window(4_096),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: None,
            timeout: DEFAULT_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a specific model instead of the first installed vision model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Names of the installed models.
    pub async fn installed_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Ollama error: {}. Is Ollama running?", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::backend(
                response.status().as_u16(),
                "Ollama tag listing failed",
            ));
        }
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("invalid /api/tags reply: {}", e)))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn resolve_model(&self) -> Result<String, ProviderError> {
        let installed = self.installed_models().await?;
        select_model(&installed, self.model.as_deref()).ok_or_else(|| {
            let wanted = self.model.as_deref().unwrap_or("llava");
            ProviderError::not_configured(format!(
                "Ollama is running but {} is not installed. Run: ollama pull {}",
                wanted, wanted
            ))
        })
    }

    fn build_request(&self, model: String, context: &PlanningContext) -> GenerateRequest {
        let images = if context.has_screenshot() {
            vec![context.screenshot.clone()]
        } else {
            Vec::new()
        };
        GenerateRequest {
            model,
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(context),
            images,
            stream: false,
            format: "json".to_string(),
            options: GenerateOptions {
                temperature: TEMPERATURE,
            },
        }
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Ollama's generate endpoint has no turns, so history goes into the prompt.
fn build_prompt(context: &PlanningContext) -> String {
    let mut prompt = String::new();
    if !context.history.is_empty() {
        prompt.push_str("Previous conversation:\n");
        for Message { role, content, .. } in &context.history {
            let speaker = match role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            let _ = writeln!(prompt, "{}: {}", speaker, content);
        }
        prompt.push('\n');
    }
    prompt.push_str(&render_request(&context.user_request, &context.ui_tree));
    prompt
}

#[async_trait]
impl ActionProvider for OllamaProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    async fn status(&self) -> ProviderStatus {
        match self.installed_models().await {
            Ok(installed) => {
                let configured = select_model(&installed, self.model.as_deref()).is_some();
                ProviderStatus::new(configured, true)
            }
            Err(e) => {
                debug!("Ollama probe failed: {}", e);
                ProviderStatus::new(false, false)
            }
        }
    }

    async fn get_actions(&self, context: &PlanningContext) -> Result<Vec<Action>, ProviderError> {
        let model = self.resolve_model().await?;
        debug!(model = %model, "Requesting actions from Ollama");
        let request = self.build_request(model, context);

        let response = self
            .client
            .post(self.url("/api/generate"))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("Ollama error: {}. Is Ollama running?", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!(status, "Ollama generate failed");
            return Err(ProviderError::backend(status, format!("Ollama error: {}", message)));
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(e.to_string()))?;
        let raw = parse_action_text(&reply.response)?;
        Ok(VALIDATOR.validate_batch(&raw)?)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
