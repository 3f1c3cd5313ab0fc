//! Native-messaging request handling.

use std::sync::Arc;

use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use serde_json::{json, Value};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use deskpilot_channel::{LenientMessageCodec, NativeMessageCodec, RequestTable, TableConfig};
use deskpilot_protocols::{
    Action, ActionProvider, ActionValidator, ChannelError, PlanningContext,
};
use deskpilot_vault::CredentialStore;

use crate::backend::AutomationBackend;

/// Actions the caller sends have been confirmed by the user.
const EXECUTE_VALIDATOR: ActionValidator = ActionValidator::new(1.0);

/// Provider id the host probes for `check_local_llm`.
const LOCAL_PROVIDER: &str = "ollama";

fn ok(mut payload: Value) -> Value {
    if let Some(obj) = payload.as_object_mut() {
        obj.insert("success".into(), Value::Bool(true));
    }
    payload
}

fn fail(error: impl Into<String>) -> Value {
    json!({ "success": false, "error": error.into() })
}

fn str_field<'a>(message: &'a Value, field: &str) -> Option<&'a str> {
    message
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Host side of the channel.
///
/// One instance serves one stdio session. Planning runs in background
/// tasks owned by the request table, so slow providers never block the
/// message loop.
pub struct HostService {
    planners: DashMap<String, Arc<dyn ActionProvider>>,
    order: RwLock<Vec<String>>,
    credentials: CredentialStore,
    table: RequestTable,
    backend: Arc<dyn AutomationBackend>,
    version: String,
}

impl HostService {
    pub fn new(
        credentials: CredentialStore,
        backend: Arc<dyn AutomationBackend>,
        table: TableConfig,
    ) -> Self {
        Self {
            planners: DashMap::new(),
            order: RwLock::new(Vec::new()),
            credentials,
            table: RequestTable::new(table),
            backend,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Version reported by `ping`.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a provider the host can plan with. A later planner with the
    /// same id replaces the earlier one.
    pub fn register_planner(&self, planner: Arc<dyn ActionProvider>) {
        let id = planner.id().to_string();
        if self.planners.insert(id.clone(), planner).is_none() {
            self.order.write().push(id.clone());
        }
        debug!("Registered host planner {}", id);
    }

    pub fn planner_ids(&self) -> Vec<String> {
        self.order.read().clone()
    }

    fn planner(&self, id: &str) -> Option<Arc<dyn ActionProvider>> {
        self.planners.get(id).map(|p| p.value().clone())
    }

    /// Hand stored credentials to the planners that take one.
    pub async fn load_credentials(&self) {
        for id in self.planner_ids() {
            let Some(planner) = self.planner(&id) else {
                continue;
            };
            if !planner.descriptor().requires_credential {
                continue;
            }
            match self.credentials.load(&id).await {
                Ok(Some(secret)) => planner.set_credential(secret),
                Ok(None) => {}
                Err(e) => warn!("Ignoring stored credential for {}: {}", id, e),
            }
        }
    }

    /// Serve framed messages until the reader hits EOF.
    ///
    /// A frame whose body is not JSON is answered with an error and the
    /// loop carries on. A bad length header ends the session.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), ChannelError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut inbound = FramedRead::new(reader, LenientMessageCodec);
        let mut outbound = FramedWrite::new(writer, NativeMessageCodec);
        info!("Native host listening on stdio");

        while let Some(frame) = inbound.next().await {
            match frame {
                Ok(Ok(message)) => {
                    let reply = self.handle(message).await;
                    outbound.send(reply).await?;
                }
                Ok(Err(e)) => {
                    warn!("Rejecting malformed message: {}", e);
                    outbound.send(fail(e.to_string())).await?;
                }
                Err(ChannelError::Protocol(reason)) => {
                    warn!("Closing on bad frame: {}", reason);
                    outbound.send(fail(reason.clone())).await?;
                    return Err(ChannelError::Protocol(reason));
                }
                Err(e) => return Err(e),
            }
        }

        info!("Native host input closed");
        Ok(())
    }

    /// Answer one message. Every reply carries `success`.
    pub async fn handle(&self, message: Value) -> Value {
        let Some(action) = message.get("action").and_then(Value::as_str) else {
            return fail("Missing 'action' field");
        };
        debug!("Handling {}", action);

        match action {
            "ping" => ok(json!({ "message": "pong", "version": self.version })),
            "get_capabilities" => self.get_capabilities().await,
            "capture_screen" => self.capture_screen().await,
            "inspect_ui" => self.inspect_ui().await,
            "execute_action" => self.execute_action(&message).await,
            "execute_actions" => self.execute_actions(&message).await,
            "check_local_llm" => self.check_local_llm().await,
            "store_api_key" => self.store_api_key(&message).await,
            "delete_api_key" => self.delete_api_key(&message).await,
            "get_provider_status" => self.get_provider_status().await,
            "get_actions" => self.submit(message),
            "poll" => self.poll(&message),
            "cancel" => self.cancel(&message),
            other => fail(format!("Unknown action: {}", other)),
        }
    }

    async fn local_llm_available(&self) -> bool {
        match self.planner(LOCAL_PROVIDER) {
            Some(planner) => planner.status().await.ready(),
            None => false,
        }
    }

    async fn get_capabilities(&self) -> Value {
        let caps = self.backend.capabilities();
        ok(json!({
            "capabilities": {
                "screen_capture": caps.screen_capture,
                "ui_automation": caps.ui_automation,
                "input_control": caps.input_control,
                "local_llm": self.local_llm_available().await,
            }
        }))
    }

    async fn capture_screen(&self) -> Value {
        match self.backend.capture_screen().await {
            Ok(shot) => ok(json!({
                "screenshot": shot.data,
                "width": shot.width,
                "height": shot.height,
            })),
            Err(e) => fail(e.to_string()),
        }
    }

    async fn inspect_ui(&self) -> Value {
        match self.backend.inspect_ui().await {
            Ok(tree) => ok(json!({ "uiTree": tree })),
            Err(e) => fail(e.to_string()),
        }
    }

    async fn run_action(&self, action: &Action) -> Value {
        match self.backend.execute(action).await {
            Ok(()) => {
                debug!("Executed {}", action);
                ok(json!({ "action": action.kind().as_str() }))
            }
            Err(e) => fail(e.to_string()),
        }
    }

    async fn execute_action(&self, message: &Value) -> Value {
        let Some(raw) = message.get("params") else {
            return fail("Missing params");
        };
        match EXECUTE_VALIDATOR.validate(raw) {
            Ok(action) => self.run_action(&action).await,
            Err(e) => fail(e.to_string()),
        }
    }

    /// The whole batch is validated before anything runs; execution stops
    /// at the first action the backend fails.
    async fn execute_actions(&self, message: &Value) -> Value {
        let Some(raw) = message
            .get("params")
            .and_then(|p| p.get("actions"))
            .and_then(Value::as_array)
        else {
            return fail("Missing actions array");
        };

        let actions = match EXECUTE_VALIDATOR.validate_batch(raw) {
            Ok(actions) => actions,
            Err(e) => return fail(e.to_string()),
        };

        let mut results = Vec::with_capacity(actions.len());
        for action in &actions {
            let result = self.run_action(action).await;
            let succeeded = result["success"] == true;
            results.push(result);
            if !succeeded {
                warn!("Stopping batch after failed {}", action);
                break;
            }
        }
        ok(json!({ "results": results }))
    }

    async fn check_local_llm(&self) -> Value {
        match self.planner(LOCAL_PROVIDER) {
            Some(planner) => {
                let status = planner.status().await;
                ok(json!({
                    "available": status.available,
                    "configured": status.configured,
                }))
            }
            None => ok(json!({
                "available": false,
                "error": "Local LLM not configured on this host",
            })),
        }
    }

    fn credential_planner(&self, message: &Value) -> Result<(String, Arc<dyn ActionProvider>), Value> {
        let Some(id) = str_field(message, "provider") else {
            return Err(fail("Missing provider"));
        };
        let Some(planner) = self.planner(id) else {
            return Err(fail(format!("Unknown provider: {}", id)));
        };
        if !planner.descriptor().requires_credential {
            return Err(fail(format!("Provider {} does not use an API key", id)));
        }
        Ok((id.to_string(), planner))
    }

    async fn store_api_key(&self, message: &Value) -> Value {
        let (id, planner) = match self.credential_planner(message) {
            Ok(found) => found,
            Err(reply) => return reply,
        };
        let Some(api_key) = str_field(message, "api_key") else {
            return fail("Missing api_key");
        };

        match self.credentials.store(&id, api_key).await {
            Ok(()) => {
                planner.set_credential(api_key.to_string());
                ok(json!({ "provider": id }))
            }
            Err(e) => fail(e.to_string()),
        }
    }

    async fn delete_api_key(&self, message: &Value) -> Value {
        let (id, planner) = match self.credential_planner(message) {
            Ok(found) => found,
            Err(reply) => return reply,
        };

        match self.credentials.delete(&id).await {
            Ok(()) => {
                planner.clear_credential();
                ok(json!({ "provider": id }))
            }
            Err(e) => fail(e.to_string()),
        }
    }

    async fn get_provider_status(&self) -> Value {
        let mut providers = serde_json::Map::new();
        for id in self.planner_ids() {
            let Some(planner) = self.planner(&id) else {
                continue;
            };
            let entry = if planner.descriptor().requires_credential {
                let has_key = self.credentials.has(&id).await.unwrap_or_else(|e| {
                    warn!("Failed to read credential for {}: {}", id, e);
                    false
                });
                json!({ "has_key": has_key, "type": "cloud" })
            } else {
                json!({
                    "has_key": false,
                    "type": "local",
                    "available": planner.status().await.available,
                })
            };
            providers.insert(id, entry);
        }
        ok(json!({ "providers": providers }))
    }

    fn submit(&self, message: Value) -> Value {
        let Some(provider) = str_field(&message, "provider").map(str::to_string) else {
            return fail("Missing provider");
        };
        let Some(planner) = self.planner(&provider) else {
            return fail(format!("Unknown provider: {}", provider));
        };
        if str_field(&message, "user_request").is_none() {
            return fail("user_request is required");
        }
        let context: PlanningContext = match serde_json::from_value(message) {
            Ok(context) => context,
            Err(e) => return fail(format!("Invalid request: {}", e)),
        };

        let request_id = self.table.submit(&provider, async move {
            planner
                .get_actions(&context)
                .await
                .map(|actions| actions.iter().map(Action::to_value).collect())
                .map_err(|e| e.to_string())
        });
        ok(json!({ "request_id": request_id, "status": "pending" }))
    }

    fn poll(&self, message: &Value) -> Value {
        let Some(request_id) = str_field(message, "request_id") else {
            return fail("Missing request_id");
        };
        let response = self.table.poll(request_id);
        match serde_json::to_value(&response) {
            Ok(payload) => ok(payload),
            Err(e) => fail(e.to_string()),
        }
    }

    fn cancel(&self, message: &Value) -> Value {
        let Some(request_id) = str_field(message, "request_id") else {
            return fail("Missing request_id");
        };
        let status = self.table.cancel(request_id);
        ok(json!({ "request_id": request_id, "status": status.as_str() }))
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
