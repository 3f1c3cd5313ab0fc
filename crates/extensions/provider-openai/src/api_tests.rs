use super::*;

#[test]
fn test_api_request_serialization() {
    let request = ApiRequest {
        model: "gpt-4o".to_string(),
        messages: vec![ApiMessage::text("system", "be terse")],
        max_tokens: 1000,
        temperature: 0.1,
        response_format: Some(ResponseFormat::json_object()),
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "gpt-4o");
    assert_eq!(json["max_tokens"], 1000);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][0]["content"], "be terse");
    assert_eq!(json["response_format"]["type"], "json_object");
}

#[test]
fn test_response_format_skipped_when_none() {
    let request = ApiRequest {
        model: "gpt-4o".to_string(),
        messages: vec![],
        max_tokens: 10,
        temperature: 0.1,
        response_format: None,
    };
    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("response_format").is_none());
}

#[test]
fn test_content_part_image_url() {
    let part = ContentPart::ImageUrl {
        image_url: ImageUrl {
            url: "data:image/png;base64,AAAA".to_string(),
            detail: Some("high".to_string()),
        },
    };
    let json = serde_json::to_value(&part).unwrap();
    assert_eq!(json["type"], "image_url");
    assert_eq!(json["image_url"]["url"], "data:image/png;base64,AAAA");
    assert_eq!(json["image_url"]["detail"], "high");
}

#[test]
fn test_response_first_text() {
    let response: ApiResponse = serde_json::from_value(serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "{}"}}]
    }))
    .unwrap();
    assert_eq!(response.first_text(), Some("{}"));
}

#[test]
fn test_response_without_choices() {
    let response: ApiResponse = serde_json::from_str("{}").unwrap();
    assert!(response.first_text().is_none());
}

#[test]
fn test_error_message_extraction() {
    let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
    assert_eq!(error_message(body), "Incorrect API key provided");
    assert_eq!(error_message("upstream down"), "upstream down");
}
