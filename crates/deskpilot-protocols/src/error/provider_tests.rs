use super::*;

#[test]
fn test_not_configured_is_verbatim() {
    let err = ProviderError::not_configured("Set OPENAI_API_KEY on the backend");
    assert_eq!(err.to_string(), "Set OPENAI_API_KEY on the backend");
}

#[test]
fn test_backend_error() {
    let err = ProviderError::backend(500, "Internal Server Error");
    assert!(err.to_string().contains("500"));
    assert!(err.to_string().contains("Internal Server Error"));
}

#[test]
fn test_malformed_response() {
    let err = ProviderError::malformed("expected JSON");
    assert!(err.to_string().contains("Malformed response"));
}

#[test]
fn test_network_error() {
    let err = ProviderError::Network("Connection refused".to_string());
    assert!(err.to_string().contains("Network error"));
}

#[test]
fn test_invalid_action_from() {
    let err: ProviderError = ActionError::invalid("click x=20000 out of range").at_index(0).into();
    assert!(matches!(err, ProviderError::InvalidAction(_)));
    assert!(err.to_string().contains("out of range"));
}

#[test]
fn test_channel_from() {
    let err: ProviderError = ChannelError::Cancelled("r1".to_string()).into();
    assert!(matches!(err, ProviderError::Channel(ChannelError::Cancelled(_))));
}

#[test]
fn test_retryable_classes() {
    assert!(ProviderError::backend(502, "bad gateway").is_retryable());
    assert!(ProviderError::malformed("x").is_retryable());
    assert!(ProviderError::Network("x".to_string()).is_retryable());
    assert!(
        ProviderError::Channel(ChannelError::Timeout {
            request_id: "r".to_string(),
            waited_ms: 10
        })
        .is_retryable()
    );
}

#[test]
fn test_non_retryable_classes() {
    assert!(!ProviderError::not_configured("x").is_retryable());
    assert!(!ProviderError::InvalidAction(ActionError::invalid("x")).is_retryable());
    assert!(!ProviderError::Channel(ChannelError::Cancelled("r".to_string())).is_retryable());
}

#[test]
fn test_provider_error_debug() {
    let err = ProviderError::Network("test".to_string());
    let debug_str = format!("{:?}", err);
    assert!(debug_str.contains("Network"));
}
