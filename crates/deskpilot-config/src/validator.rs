//! Configuration validation.

use crate::schema::Config;

/// Lowest PBKDF2 iteration count the vault accepts.
pub const MIN_VAULT_ITERATIONS: u32 = 100_000;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_vault(config, &mut result);
        Self::validate_channel(config, &mut result);
        Self::validate_endpoints(config, &mut result);
        Self::validate_host(config, &mut result);

        result
    }

    fn validate_vault(config: &Config, result: &mut ValidationResult) {
        if config.vault.iterations < MIN_VAULT_ITERATIONS {
            result.add_warning(ValidationWarning::new(
                "vault.iterations",
                format!(
                    "{} is below the minimum, {} will be used",
                    config.vault.iterations, MIN_VAULT_ITERATIONS
                ),
            ));
        }
    }

    fn validate_channel(config: &Config, result: &mut ValidationResult) {
        let channel = &config.channel;

        if channel.poll_interval_ms == 0 {
            result.add_error(ValidationError::new(
                "channel.poll_interval_ms",
                "poll_interval_ms must be greater than 0",
            ));
        }

        if channel.poll_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "channel.poll_timeout_ms",
                "poll_timeout_ms must be greater than 0",
            ));
        } else if channel.poll_timeout_ms < channel.poll_interval_ms {
            result.add_warning(ValidationWarning::new(
                "channel.poll_timeout_ms",
                "poll_timeout_ms is shorter than poll_interval_ms, requests get one poll at most",
            ));
        }

        if channel.max_concurrent == 0 {
            result.add_error(ValidationError::new(
                "channel.max_concurrent",
                "max_concurrent must be greater than 0",
            ));
        }

        if channel.retention_secs == 0 {
            result.add_warning(ValidationWarning::new(
                "channel.retention_secs",
                "finished requests are dropped before they can be polled",
            ));
        }
    }

    fn validate_endpoints(config: &Config, result: &mut ValidationResult) {
        let endpoints = [
            ("backend.base_url", &config.backend.base_url),
            ("ollama.base_url", &config.ollama.base_url),
            ("openai.base_url", &config.openai.base_url),
            ("anthropic.base_url", &config.anthropic.base_url),
        ];
        for (path, url) in endpoints {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    path,
                    "base_url must start with http:// or https://",
                ));
            }
        }

        let timeouts = [
            ("backend.timeout_secs", config.backend.timeout_secs),
            ("ollama.timeout_secs", config.ollama.timeout_secs),
            ("openai.timeout_secs", config.openai.timeout_secs),
            ("anthropic.timeout_secs", config.anthropic.timeout_secs),
        ];
        for (path, secs) in timeouts {
            if secs == 0 {
                result.add_error(ValidationError::new(path, "timeout must be greater than 0"));
            }
        }

        if config.openai.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "openai.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
        if config.anthropic.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "anthropic.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }
    }

    fn validate_host(config: &Config, result: &mut ValidationResult) {
        const KNOWN: [&str; 3] = ["openai", "anthropic", "ollama"];

        if config.host.providers.is_empty() {
            result.add_warning(ValidationWarning::new(
                "host.providers",
                "no providers configured, the host can only report capabilities",
            ));
        }
        for id in &config.host.providers {
            if !KNOWN.contains(&id.as_str()) {
                result.add_error(ValidationError::new(
                    "host.providers",
                    format!("Unknown provider '{}', valid values: {:?}", id, KNOWN),
                ));
            }
        }
        if config.native_host.enabled && !KNOWN.contains(&config.native_host.provider.as_str()) {
            result.add_error(ValidationError::new(
                "native_host.provider",
                format!(
                    "Unknown provider '{}', valid values: {:?}",
                    config.native_host.provider, KNOWN
                ),
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
