//! Provider registration for deskpilot.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use deskpilot_channel::{ChannelClient, NativeHostClient, PollOptions, TableConfig};
use deskpilot_config::Config;
use deskpilot_core::ProviderRegistry;
use deskpilot_host::{HostService, UnsupportedBackend};
use deskpilot_protocols::{ActionProvider, KeyValueStore};
use deskpilot_provider_anthropic::AnthropicProvider;
use deskpilot_provider_backend::BackendProxyProvider;
use deskpilot_provider_native::NativeHostProvider;
use deskpilot_provider_ollama::OllamaProvider;
use deskpilot_provider_openai::OpenAIProvider;
use deskpilot_vault::{CredentialStore, FileStore, Fingerprint, Vault};

pub(crate) fn table_config(config: &Config) -> TableConfig {
    TableConfig {
        max_concurrent: config.channel.max_concurrent,
        retention: Duration::from_secs(config.channel.retention_secs),
    }
}

pub(crate) fn poll_options(config: &Config) -> PollOptions {
    PollOptions {
        interval: Duration::from_millis(config.channel.poll_interval_ms),
        timeout: Duration::from_millis(config.channel.poll_timeout_ms),
    }
}

fn credential_store(config: &Config, store: Arc<dyn KeyValueStore>) -> CredentialStore {
    let vault = Vault::with_iterations(Fingerprint::local(), config.vault.iterations);
    CredentialStore::new(Arc::new(vault), store)
}

fn openai(config: &Config) -> OpenAIProvider {
    OpenAIProvider::new()
        .with_base_url(&config.openai.base_url)
        .with_model(&config.openai.model)
        .with_max_tokens(config.openai.max_tokens)
        .with_timeout(Duration::from_secs(config.openai.timeout_secs))
}

fn anthropic(config: &Config) -> AnthropicProvider {
    AnthropicProvider::new()
        .with_base_url(&config.anthropic.base_url)
        .with_model(&config.anthropic.model)
        .with_max_tokens(config.anthropic.max_tokens)
        .with_timeout(Duration::from_secs(config.anthropic.timeout_secs))
}

fn ollama(config: &Config) -> OllamaProvider {
    let provider = OllamaProvider::new()
        .with_base_url(&config.ollama.base_url)
        .with_timeout(Duration::from_secs(config.ollama.timeout_secs));
    match &config.ollama.model {
        Some(model) => provider.with_model(model),
        None => provider,
    }
}

fn backend_timeout(config: &Config) -> Duration {
    Duration::from_secs(config.backend.timeout_secs)
}

/// Wrap the native host as a provider. The host process starts with the
/// first message sent to it, so commands that never plan do not launch it.
fn native(config: &Config, config_path: &Path) -> Option<NativeHostProvider> {
    let mut args = config.native_host.args.clone();
    let program = match &config.native_host.program {
        Some(program) => program.clone(),
        None => match std::env::current_exe() {
            Ok(exe) => {
                // Our own host should read the same configuration.
                args.push("--config".to_string());
                args.push(config_path.to_string_lossy().into_owned());
                exe
            }
            Err(e) => {
                warn!("Cannot locate the deskpilot executable for the native host: {}", e);
                return None;
            }
        },
    };

    let client = NativeHostClient::on_demand(&program, &args);
    let client = ChannelClient::with_options(Arc::new(client), poll_options(config));
    Some(NativeHostProvider::new(
        Arc::new(client),
        &config.native_host.provider,
    ))
}

/// Register every provider the configuration enables.
pub(crate) fn register_providers(registry: &ProviderRegistry, config: &Config, config_path: &Path) {
    let mut providers: Vec<Arc<dyn ActionProvider>> = vec![
        Arc::new(openai(config)),
        Arc::new(anthropic(config)),
        Arc::new(
            BackendProxyProvider::openai(&config.backend.base_url)
                .with_timeout(backend_timeout(config)),
        ),
        Arc::new(
            BackendProxyProvider::anthropic(&config.backend.base_url)
                .with_timeout(backend_timeout(config)),
        ),
        Arc::new(ollama(config)),
    ];

    if config.native_host.enabled {
        if let Some(provider) = native(config, config_path) {
            providers.push(Arc::new(provider));
        }
    }

    for provider in providers {
        let id = provider.id().to_string();
        if let Err(e) = registry.register(provider) {
            warn!("Failed to register provider {}: {}", id, e);
        } else {
            debug!("Registered provider {}", id);
        }
    }

    info!("Registered providers: {:?}", registry.ids());
}

/// Registry backed by the CLI's state file, with the saved selection and
/// credentials restored.
pub(crate) async fn build_registry(config: &Config, config_path: &Path) -> ProviderRegistry {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.storage.state_path()));
    let registry = ProviderRegistry::new(store.clone(), credential_store(config, store));
    register_providers(&registry, config, config_path);

    match registry.restore().await {
        Some(active) => info!("Active provider: {}", active),
        None => warn!("No provider registered"),
    }
    registry
}

/// Planner the host can run for `id`.
fn host_planner(id: &str, config: &Config) -> Option<Arc<dyn ActionProvider>> {
    match id {
        "openai" => Some(Arc::new(openai(config))),
        "anthropic" => Some(Arc::new(anthropic(config))),
        "ollama" => Some(Arc::new(ollama(config))),
        _ => None,
    }
}

/// Host service with its own state file and the configured planners.
pub(crate) async fn build_host(config: &Config) -> HostService {
    let store: Arc<dyn KeyValueStore> =
        Arc::new(FileStore::new(config.storage.host_state_path()));
    let service = HostService::new(
        credential_store(config, store),
        Arc::new(UnsupportedBackend),
        table_config(config),
    )
    .with_version(&config.host.version);

    for id in &config.host.providers {
        match host_planner(id, config) {
            Some(planner) => service.register_planner(planner),
            None => warn!("Unknown host provider {} ignored", id),
        }
    }

    service.load_credentials().await;
    info!("Host planners: {:?}", service.planner_ids());
    service
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_channel_settings_from_config() {
        let mut config = Config::default();
        config.channel.poll_interval_ms = 250;
        config.channel.poll_timeout_ms = 5_000;
        config.channel.max_concurrent = 2;
        config.channel.retention_secs = 60;

        let options = poll_options(&config);
        assert_eq!(options.interval, Duration::from_millis(250));
        assert_eq!(options.timeout, Duration::from_secs(5));

        let table = table_config(&config);
        assert_eq!(table.max_concurrent, 2);
        assert_eq!(table.retention, Duration::from_secs(60));
    }

    #[test]
    fn test_host_planner_ids() {
        let config = Config::default();
        for id in ["openai", "anthropic", "ollama"] {
            assert_eq!(host_planner(id, &config).unwrap().id(), id);
        }
        assert!(host_planner("backend-openai", &config).is_none());
        assert!(host_planner("native", &config).is_none());
    }

    #[tokio::test]
    async fn test_register_without_native_host() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.native_host.enabled = false;

        let registry = build_registry(&config, &dir.path().join("config.toml")).await;
        assert_eq!(
            registry.ids(),
            vec!["openai", "anthropic", "backend-openai", "backend-anthropic", "ollama"]
        );
        assert_eq!(registry.active_id().as_deref(), Some("openai"));
    }

    #[tokio::test]
    async fn test_native_host_not_started_by_registration() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.native_host.enabled = true;
        config.native_host.program = Some(PathBuf::from("/nonexistent/deskpilot-host"));

        let registry = build_registry(&config, &dir.path().join("config.toml")).await;
        assert!(registry.ids().contains(&"native".to_string()));
        assert!(registry.set_active("native").await);

        // The host only starts when asked to plan.
        let native = registry.get("native").unwrap();
        assert!(!native.status().await.available);
    }
}
