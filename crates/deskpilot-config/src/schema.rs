//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub vault: VaultConfig,

    #[serde(default)]
    pub channel: ChannelConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub openai: OpenAIConfig,

    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub native_host: NativeHostConfig,

    #[serde(default)]
    pub host: HostConfig,
}

/// Where state and logs live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Key-value document, relative to `data_dir` unless absolute.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Document used by `deskpilot host`. Keys for host-side planners are
    /// stored here with the `store_api_key` action.
    #[serde(default = "default_host_state_file")]
    pub host_state_file: PathBuf,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

impl StorageConfig {
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }

    pub fn host_state_path(&self) -> PathBuf {
        self.data_dir.join(&self.host_state_file)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state_file: default_state_file(),
            host_state_file: default_host_state_file(),
            log_dir: default_log_dir(),
            max_log_files: default_max_log_files(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deskpilot")
}

fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}

fn default_host_state_file() -> PathBuf {
    PathBuf::from("host-state.json")
}

fn default_log_dir() -> PathBuf {
    default_data_dir().join("logs")
}

fn default_max_log_files() -> usize {
    7
}

/// Credential vault settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// PBKDF2 iterations.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u32 {
    100_000
}

/// Async request channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Requests the host plans at the same time.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Seconds a finished request stays pollable on the host.
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
            max_concurrent: default_max_concurrent(),
            retention_secs: default_retention_secs(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_poll_timeout_ms() -> u64 {
    120_000
}

fn default_max_concurrent() -> usize {
    1
}

fn default_retention_secs() -> u64 {
    300
}

/// Cloud proxy backend that holds the vendor keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_secs: default_request_timeout(),
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

/// Local Ollama daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// Vision model to use. Picked from the installed models when unset.
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            model: None,
            timeout_secs: default_request_timeout(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

/// Direct OpenAI access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    #[serde(default = "default_openai_model")]
    pub model: String,

    #[serde(default = "default_openai_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_cloud_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_url(),
            model: default_openai_model(),
            max_tokens: default_openai_max_tokens(),
            timeout_secs: default_cloud_timeout(),
        }
    }
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_max_tokens() -> u32 {
    1000
}

fn default_cloud_timeout() -> u64 {
    60
}

/// Direct Anthropic access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default = "default_anthropic_url")]
    pub base_url: String,

    #[serde(default = "default_anthropic_model")]
    pub model: String,

    #[serde(default = "default_anthropic_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_cloud_timeout")]
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_url(),
            model: default_anthropic_model(),
            max_tokens: default_anthropic_max_tokens(),
            timeout_secs: default_cloud_timeout(),
        }
    }
}

fn default_anthropic_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_anthropic_max_tokens() -> u32 {
    1024
}

/// How the CLI reaches the native automation host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeHostConfig {
    #[serde(default = "default_native_enabled")]
    pub enabled: bool,

    /// Host executable. Defaults to this binary.
    #[serde(default)]
    pub program: Option<PathBuf>,

    #[serde(default = "default_native_args")]
    pub args: Vec<String>,

    /// Provider the host plans with.
    #[serde(default = "default_native_provider")]
    pub provider: String,
}

impl Default for NativeHostConfig {
    fn default() -> Self {
        Self {
            enabled: default_native_enabled(),
            program: None,
            args: default_native_args(),
            provider: default_native_provider(),
        }
    }
}

fn default_native_enabled() -> bool {
    true
}

fn default_native_args() -> Vec<String> {
    vec!["host".to_string()]
}

fn default_native_provider() -> String {
    "ollama".to_string()
}

/// Settings for `deskpilot host`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    /// Providers the host plans with.
    #[serde(default = "default_host_providers")]
    pub providers: Vec<String>,

    /// Version reported by `ping`.
    #[serde(default = "default_host_version")]
    pub version: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            providers: default_host_providers(),
            version: default_host_version(),
        }
    }
}

fn default_host_providers() -> Vec<String> {
    vec![
        "openai".to_string(),
        "anthropic".to_string(),
        "ollama".to_string(),
    ]
}

fn default_host_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
