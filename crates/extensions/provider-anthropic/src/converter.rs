//! Planning context to Anthropic messages.

use deskpilot_protocols::provider::{render_request, PlanningContext};

use crate::api::{ApiContent, ApiMessage, ContentBlock, ImageSource};

/// Prior turns followed by the request, screenshot first.
pub fn build_messages(context: &PlanningContext) -> Vec<ApiMessage> {
    let mut messages: Vec<ApiMessage> = context
        .history
        .iter()
        .map(|turn| ApiMessage {
            role: turn.role.as_str().to_string(),
            content: ApiContent::Text(turn.content.clone()),
        })
        .collect();

    let mut blocks = Vec::with_capacity(2);
    if context.has_screenshot() {
        blocks.push(ContentBlock::Image {
            source: ImageSource::png(context.screenshot.clone()),
        });
    }
    blocks.push(ContentBlock::Text {
        text: render_request(&context.user_request, &context.ui_tree),
    });
    messages.push(ApiMessage {
        role: "user".to_string(),
        content: ApiContent::Blocks(blocks),
    });

    messages
}
