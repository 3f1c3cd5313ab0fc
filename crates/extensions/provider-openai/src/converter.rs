//! Planning context to OpenAI messages.

use deskpilot_protocols::provider::{render_request, PlanningContext, SYSTEM_PROMPT};

use crate::api::{ApiMessage, ContentPart, ImageUrl, MessageContent};

/// System prompt, prior turns, then the request with the screenshot attached.
pub fn build_messages(context: &PlanningContext) -> Vec<ApiMessage> {
    let mut messages = Vec::with_capacity(context.history.len() + 2);
    messages.push(ApiMessage::text("system", SYSTEM_PROMPT));

    for turn in &context.history {
        messages.push(ApiMessage::text(turn.role.as_str(), turn.content.clone()));
    }

    let text = render_request(&context.user_request, &context.ui_tree);
    let content = if context.has_screenshot() {
        MessageContent::Parts(vec![
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:image/png;base64,{}", context.screenshot),
                    detail: Some("high".to_string()),
                },
            },
            ContentPart::Text { text },
        ])
    } else {
        MessageContent::Text(text)
    };
    messages.push(ApiMessage {
        role: "user".to_string(),
        content,
    });

    messages
}
