//! Bounded conversation history.

use deskpilot_protocols::{Action, Message};
use serde_json::json;
use std::collections::VecDeque;

/// Maximum number of messages kept (ten exchanges).
pub const HISTORY_LIMIT: usize = 20;

/// Ordered user/assistant turns, trimmed from the front once full.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<Message>,
    limit: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Record a completed exchange. The assistant turn is the planned
    /// actions serialized as `{"actions": [...]}`.
    pub fn push_exchange(&mut self, user_request: &str, actions: &[Action]) {
        self.push(Message::user(user_request));
        self.push(Message::assistant(
            json!({ "actions": actions }).to_string(),
        ));
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.limit {
            self.messages.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskpilot_protocols::{ActionParams, MessageRole};

    fn click() -> Action {
        Action::try_new(ActionParams::click(10.0, 20.0), 0.9).unwrap()
    }

    #[test]
    fn test_push_exchange() {
        let mut history = ConversationHistory::new();
        history.push_exchange("open notepad", &[click()]);

        let messages = history.snapshot();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "open notepad");
        assert_eq!(messages[1].role, MessageRole::Assistant);

        let body: serde_json::Value = serde_json::from_str(&messages[1].content).unwrap();
        assert_eq!(body["actions"][0]["action"], "click");
    }

    #[test]
    fn test_bounded_fifo() {
        let mut history = ConversationHistory::new();
        for i in 0..11 {
            history.push_exchange(&format!("request {}", i), &[click()]);
        }
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.snapshot()[0].content, "request 1");
    }

    #[test]
    fn test_clear() {
        let mut history = ConversationHistory::default();
        history.push_exchange("x", &[click()]);
        history.clear();
        assert!(history.is_empty());
    }
}
