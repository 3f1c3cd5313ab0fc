use super::*;
use deskpilot_protocols::action::ActionKind;
use serde_json::json;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

async fn mount_health(server: &MockServer, openai: bool, anthropic: bool) {
    Mock::given(matchers::method("GET"))
        .and(matchers::path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "providers": {"openai": openai, "anthropic": anthropic, "ollama": true}
        })))
        .mount(server)
        .await;
}

#[test]
fn test_descriptor() {
    let provider = BackendProxyProvider::openai("http://localhost:5000");
    assert_eq!(provider.id(), "backend-openai");
    assert!(!provider.descriptor().requires_credential);
    assert_eq!(provider.vendor(), Vendor::OpenAI);

    let provider = BackendProxyProvider::anthropic("http://localhost:5000");
    assert_eq!(provider.id(), "backend-anthropic");
}

#[tokio::test]
async fn test_status_reflects_health() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, true, false).await;

    let openai = BackendProxyProvider::openai(mock_server.uri());
    assert_eq!(openai.status().await, ProviderStatus::new(true, true));

    let anthropic = BackendProxyProvider::anthropic(mock_server.uri());
    assert_eq!(anthropic.status().await, ProviderStatus::new(false, true));
}

#[tokio::test]
async fn test_status_unreachable() {
    let provider = BackendProxyProvider::openai("http://127.0.0.1:1");
    assert_eq!(provider.status().await, ProviderStatus::new(false, false));
}

#[tokio::test]
async fn test_get_actions_not_configured() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, false, false).await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/get-actions"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let err = BackendProxyProvider::openai(mock_server.uri())
        .get_actions(&PlanningContext::new("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotConfigured(_)));
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_get_actions_success() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, true, true).await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/get-actions"))
        .and(matchers::body_partial_json(json!({
            "provider": "anthropic",
            "user_request": "click ok",
            "screenshot": "AAAA"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "actions": [
                {"action": "click", "params": {"x": 100, "y": 200}},
                {"action": "wait", "params": {"ms": 250}, "confidence": 0.5}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let actions = BackendProxyProvider::anthropic(mock_server.uri())
        .get_actions(&PlanningContext::new("click ok").with_screenshot("AAAA"))
        .await
        .unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].kind(), ActionKind::Click);
    assert!((actions[0].confidence() - 0.85).abs() < f64::EPSILON);
    assert!((actions[1].confidence() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_get_actions_wrapped_object() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, true, false).await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/get-actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "actions": {"actions": [{"action": "type", "params": {"text": "hello"}}]}
        })))
        .mount(&mock_server)
        .await;

    let actions = BackendProxyProvider::openai(mock_server.uri())
        .get_actions(&PlanningContext::new("type hello"))
        .await
        .unwrap();
    assert_eq!(actions[0].kind(), ActionKind::Type);
}

#[tokio::test]
async fn test_backend_error_field() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, true, false).await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/get-actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "OpenAI API error: 500 Server Error"
        })))
        .mount(&mock_server)
        .await;

    let err = BackendProxyProvider::openai(mock_server.uri())
        .get_actions(&PlanningContext::new("hi"))
        .await
        .unwrap_err();
    match err {
        ProviderError::Backend { message, .. } => assert!(message.contains("500 Server Error")),
        other => panic!("Expected Backend, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, true, false).await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/get-actions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "user_request is required"
        })))
        .mount(&mock_server)
        .await;

    let err = BackendProxyProvider::openai(mock_server.uri())
        .get_actions(&PlanningContext::new(""))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Backend { status: 400, .. }));
}

#[tokio::test]
async fn test_success_without_actions_is_malformed() {
    let mock_server = MockServer::start().await;
    mount_health(&mock_server, true, false).await;

    Mock::given(matchers::method("POST"))
        .and(matchers::path("/api/get-actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&mock_server)
        .await;

    let err = BackendProxyProvider::openai(mock_server.uri())
        .get_actions(&PlanningContext::new("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    let err = BackendProxyProvider::openai("http://127.0.0.1:1")
        .get_actions(&PlanningContext::new("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Network(_)));
    assert!(err.is_retryable());
}
