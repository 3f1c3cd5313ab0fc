//! Backend proxy JSON contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// `GET /api/health`.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub providers: HashMap<String, bool>,
}

impl HealthResponse {
    pub fn has_key(&self, vendor: &str) -> bool {
        self.providers.get(vendor).copied().unwrap_or(false)
    }
}

/// `POST /api/get-actions` body.
#[derive(Debug, Serialize)]
pub struct ActionsRequest<'a> {
    pub provider: &'a str,
    pub screenshot: &'a str,
    pub ui_tree: &'a Value,
    pub user_request: &'a str,
}

/// `POST /api/get-actions` reply: `{success, actions}` or `{error}`.
#[derive(Debug, Default, Deserialize)]
pub struct ActionsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub actions: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_health_has_key() {
        let health: HealthResponse = serde_json::from_value(json!({
            "status": "ok",
            "providers": {"openai": true, "anthropic": false, "ollama": true}
        }))
        .unwrap();
        assert!(health.has_key("openai"));
        assert!(!health.has_key("anthropic"));
        assert!(!health.has_key("gemini"));
    }

    #[test]
    fn test_request_serialization() {
        let tree = json!({"name": "Desktop"});
        let body = ActionsRequest {
            provider: "anthropic",
            screenshot: "AAAA",
            ui_tree: &tree,
            user_request: "open mail",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["provider"], "anthropic");
        assert_eq!(json["ui_tree"]["name"], "Desktop");
        assert_eq!(json["user_request"], "open mail");
    }

    #[test]
    fn test_error_reply() {
        let reply: ActionsResponse =
            serde_json::from_value(json!({"error": "Failed to parse AI response", "raw_response": "?"}))
                .unwrap();
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("Failed to parse AI response"));
    }
}
