//! Caller side of the request channel.

use async_trait::async_trait;
use deskpilot_protocols::{ChannelError, PlanningContext};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::config::PollOptions;
use crate::request::{PollResponse, RequestStatus};

/// One request/reply exchange with the native host.
#[async_trait]
pub trait HostTransport: Send + Sync {
    async fn exchange(&self, message: Value) -> Result<Value, ChannelError>;
}

/// Submit / poll / cancel client.
pub struct ChannelClient {
    transport: Arc<dyn HostTransport>,
    options: PollOptions,
}

impl ChannelClient {
    pub fn new(transport: Arc<dyn HostTransport>) -> Self {
        Self::with_options(transport, PollOptions::default())
    }

    pub fn with_options(transport: Arc<dyn HostTransport>, options: PollOptions) -> Self {
        Self { transport, options }
    }

    pub fn options(&self) -> PollOptions {
        self.options
    }

    /// Send `message` and fail with [`ChannelError::Host`] when the host
    /// answers `success: false`.
    pub async fn call(&self, message: Value) -> Result<Value, ChannelError> {
        let reply = self.transport.exchange(message).await?;
        if reply.get("success").and_then(Value::as_bool) == Some(false) {
            let error = reply
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("native host reported a failure");
            return Err(ChannelError::Host(error.to_string()));
        }
        Ok(reply)
    }

    pub async fn ping(&self) -> Result<Value, ChannelError> {
        self.call(json!({ "action": "ping" })).await
    }

    /// Start planning on the host and return the request id.
    pub async fn submit(
        &self,
        provider: &str,
        context: &PlanningContext,
    ) -> Result<String, ChannelError> {
        let mut message = Map::new();
        message.insert("action".into(), json!("get_actions"));
        message.insert("provider".into(), json!(provider));
        message.insert("user_request".into(), json!(context.user_request));
        if context.has_screenshot() {
            message.insert("screenshot".into(), json!(context.screenshot));
        }
        if !context.ui_tree.is_null() {
            message.insert("ui_tree".into(), context.ui_tree.clone());
        }
        if !context.history.is_empty() {
            message.insert("history".into(), json!(context.history));
        }

        let reply = self.call(Value::Object(message)).await?;
        let request_id = reply
            .get("request_id")
            .and_then(Value::as_str)
            .ok_or_else(|| ChannelError::Protocol("reply has no request_id".to_string()))?;
        debug!("Submitted request {} to native host", request_id);
        Ok(request_id.to_string())
    }

    pub async fn poll(&self, request_id: &str) -> Result<PollResponse, ChannelError> {
        let reply = self
            .call(json!({ "action": "poll", "request_id": request_id }))
            .await?;
        serde_json::from_value(reply)
            .map_err(|e| ChannelError::Protocol(format!("invalid poll reply: {}", e)))
    }

    pub async fn cancel(&self, request_id: &str) -> Result<RequestStatus, ChannelError> {
        let reply = self
            .call(json!({ "action": "cancel", "request_id": request_id }))
            .await?;
        let status = reply.get("status").cloned().unwrap_or(Value::Null);
        serde_json::from_value(status)
            .map_err(|e| ChannelError::Protocol(format!("invalid cancel reply: {}", e)))
    }

    /// Poll until the request reaches a terminal status.
    ///
    /// Sleeps `interval` between polls. Past `timeout` the request is
    /// cancelled and [`ChannelError::Timeout`] returned.
    pub async fn poll_until_complete(&self, request_id: &str) -> Result<Vec<Value>, ChannelError> {
        let started = Instant::now();
        loop {
            let response = self.poll(request_id).await?;
            match response.status {
                RequestStatus::Complete => return Ok(response.actions.unwrap_or_default()),
                RequestStatus::Error => {
                    return Err(ChannelError::Host(
                        response
                            .error
                            .unwrap_or_else(|| "planning failed".to_string()),
                    ));
                }
                RequestStatus::Cancelled => {
                    return Err(ChannelError::Cancelled(request_id.to_string()));
                }
                RequestStatus::NotFound => {
                    return Err(ChannelError::NotFound(request_id.to_string()));
                }
                RequestStatus::Pending => {}
            }

            let elapsed = started.elapsed();
            if elapsed >= self.options.timeout {
                if let Err(e) = self.cancel(request_id).await {
                    warn!("Failed to cancel timed out request {}: {}", request_id, e);
                }
                return Err(ChannelError::Timeout {
                    request_id: request_id.to_string(),
                    waited_ms: elapsed.as_millis() as u64,
                });
            }
            sleep(self.options.interval.min(self.options.timeout - elapsed)).await;
        }
    }

    /// Submit and wait for the result.
    pub async fn request_actions(
        &self,
        provider: &str,
        context: &PlanningContext,
    ) -> Result<Vec<Value>, ChannelError> {
        let request_id = self.submit(provider, context).await?;
        self.poll_until_complete(&request_id).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
