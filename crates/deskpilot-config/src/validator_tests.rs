use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_low_iterations_warns() {
    let mut config = Config::default();
    config.vault.iterations = 1000;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "vault.iterations"));
}

#[test]
fn test_zero_poll_interval() {
    let mut config = Config::default();
    config.channel.poll_interval_ms = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "channel.poll_interval_ms"));
}

#[test]
fn test_timeout_shorter_than_interval_warns() {
    let mut config = Config::default();
    config.channel.poll_interval_ms = 1000;
    config.channel.poll_timeout_ms = 500;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "channel.poll_timeout_ms"));
}

#[test]
fn test_zero_max_concurrent() {
    let mut config = Config::default();
    config.channel.max_concurrent = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "channel.max_concurrent"));
}

#[test]
fn test_invalid_base_url() {
    let mut config = Config::default();
    config.ollama.base_url = "localhost:11434".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    let err = result
        .errors
        .iter()
        .find(|e| e.path == "ollama.base_url")
        .unwrap();
    assert!(err.to_string().contains("http://"));
}

#[test]
fn test_zero_timeout() {
    let mut config = Config::default();
    config.anthropic.timeout_secs = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "anthropic.timeout_secs"));
}

#[test]
fn test_unknown_host_provider() {
    let mut config = Config::default();
    config.host.providers.push("gemini".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors[0].message.contains("gemini"));
}

#[test]
fn test_empty_host_providers_warns() {
    let mut config = Config::default();
    config.host.providers.clear();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "host.providers"));
}

#[test]
fn test_disabled_native_host_ignores_provider() {
    let mut config = Config::default();
    config.native_host.enabled = false;
    config.native_host.provider = "unknown".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
}
