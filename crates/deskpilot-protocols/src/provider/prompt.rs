//! Shared planning prompt.

use serde_json::Value;

/// System prompt shared by every model-backed provider.
pub const SYSTEM_PROMPT: &str = r#"You are a desktop automation assistant. Look at the screenshot and the UI tree, then plan the actions that fulfil the user's request.

Reply with a JSON object of the form {"actions": [...]} where each entry is one of:
- {"action": "click", "params": {"x": 100, "y": 200}, "confidence": 0.9}
- {"action": "type", "params": {"text": "hello"}, "confidence": 0.9}
- {"action": "press_keys", "params": {"keys": ["ctrl", "s"]}, "confidence": 0.9}
- {"action": "scroll", "params": {"delta": -3, "x": 500, "y": 400}, "confidence": 0.9}
- {"action": "wait", "params": {"ms": 1000}, "confidence": 0.9}

Locate elements in the UI tree by name or type and click the centre of their bounds: x + width/2, y + height/2.
Coordinates lie within 0..10000, waits within 0..30000 ms.
Return only the JSON object, with no explanation."#;

/// The user turn for a request.
pub fn render_request(user_request: &str, ui_tree: &Value) -> String {
    if ui_tree.is_null() {
        return format!("User request: {}", user_request);
    }
    let tree = serde_json::to_string_pretty(ui_tree).unwrap_or_else(|_| ui_tree.to_string());
    format!("User request: {}\n\nUI tree:\n{}", user_request, tree)
}
