//! Planning context passed to providers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Message;

/// Everything a provider sees for one request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningContext {
    /// Base64 PNG screenshot, empty when none was captured.
    #[serde(default)]
    pub screenshot: String,

    /// Accessibility tree of the foreground window.
    #[serde(default)]
    pub ui_tree: Value,

    pub user_request: String,

    /// Prior exchanges, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<Message>,
}

impl PlanningContext {
    pub fn new(user_request: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            ..Default::default()
        }
    }

    pub fn with_screenshot(mut self, screenshot: impl Into<String>) -> Self {
        self.screenshot = screenshot.into();
        self
    }

    pub fn with_ui_tree(mut self, ui_tree: Value) -> Self {
        self.ui_tree = ui_tree;
        self
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.history = history;
        self
    }

    pub fn has_screenshot(&self) -> bool {
        !self.screenshot.is_empty()
    }
}
