use super::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.storage.data_dir.ends_with(".deskpilot"));
    assert_eq!(config.storage.state_path().file_name().unwrap(), "state.json");
    assert_eq!(
        config.storage.host_state_path().file_name().unwrap(),
        "host-state.json"
    );
    assert_ne!(config.storage.host_state_path(), config.storage.state_path());
    assert_eq!(config.vault.iterations, 100_000);
    assert_eq!(config.channel.poll_interval_ms, 500);
    assert_eq!(config.channel.poll_timeout_ms, 120_000);
    assert_eq!(config.channel.max_concurrent, 1);
    assert_eq!(config.channel.retention_secs, 300);
    assert_eq!(config.backend.base_url, "http://localhost:5000");
    assert_eq!(config.ollama.base_url, "http://localhost:11434");
    assert!(config.ollama.model.is_none());
    assert_eq!(config.openai.model, "gpt-4o");
    assert_eq!(config.openai.max_tokens, 1000);
    assert_eq!(config.anthropic.model, "claude-sonnet-4-20250514");
    assert_eq!(config.native_host.args, vec!["host".to_string()]);
    assert_eq!(config.host.providers.len(), 3);
}

#[test]
fn test_partial_section_keeps_defaults() {
    let config: Config = toml::from_str(
        r#"
        [openai]
        model = "gpt-4o-mini"
        "#,
    )
    .unwrap();
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert_eq!(config.openai.max_tokens, 1000);
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
}

#[test]
fn test_absolute_state_file() {
    let mut storage = StorageConfig::default();
    storage.state_file = PathBuf::from("/var/lib/deskpilot/state.json");
    assert_eq!(
        storage.state_path(),
        PathBuf::from("/var/lib/deskpilot/state.json")
    );
}

#[test]
fn test_round_trip_through_toml() {
    let config = Config::default();
    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed.channel.poll_timeout_ms, config.channel.poll_timeout_ms);
    assert_eq!(parsed.host.providers, config.host.providers);
}
