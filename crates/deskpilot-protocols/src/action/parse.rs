//! Extract raw actions from model output text.

use serde_json::Value;

use crate::error::ProviderError;

/// Strip a surrounding markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = match body.rfind("```") {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Parse model output into raw action objects.
///
/// Accepts a bare JSON array or an object carrying an `actions` array.
pub fn parse_action_text(text: &str) -> Result<Vec<Value>, ProviderError> {
    let body = strip_code_fence(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::malformed(format!("model did not return valid JSON: {}", e)))?;
    extract_actions(value)
}

/// Pull the action list out of an already parsed model reply.
pub fn extract_actions(value: Value) -> Result<Vec<Value>, ProviderError> {
    let actions = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("actions") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ProviderError::malformed(
                    "model reply has no actions array",
                ));
            }
        },
        _ => {
            return Err(ProviderError::malformed(
                "model reply is not an array of actions",
            ));
        }
    };
    if actions.is_empty() {
        return Err(ProviderError::malformed("no actions returned"));
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fence_with_language() {
        let text = "```json\n[{\"action\":\"wait\"}]\n```";
        assert_eq!(strip_code_fence(text), "[{\"action\":\"wait\"}]");
    }

    #[test]
    fn test_strip_fence_without_language() {
        let text = "  ```\n{\"actions\": []}\n```  ";
        assert_eq!(strip_code_fence(text), "{\"actions\": []}");
    }

    #[test]
    fn test_no_fence_untouched() {
        assert_eq!(strip_code_fence(" [1] \n"), "[1]");
    }

    #[test]
    fn test_parse_bare_array() {
        let actions = parse_action_text(r#"[{"action":"wait","params":{"ms":1}}]"#).unwrap();
        assert_eq!(actions.len(), 1);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let text = "```json\n{\"actions\":[{\"action\":\"type\",\"params\":{\"text\":\"a\"}}]}\n```";
        let actions = parse_action_text(text).unwrap();
        assert_eq!(actions[0]["action"], "type");
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_action_text("Sure! Click the button.").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_wrong_shape() {
        assert!(parse_action_text("{\"steps\": []}").is_err());
        assert!(parse_action_text("42").is_err());
    }

    #[test]
    fn test_parse_empty_list() {
        let err = parse_action_text("[]").unwrap_err();
        assert!(err.to_string().contains("no actions returned"));
    }
}
