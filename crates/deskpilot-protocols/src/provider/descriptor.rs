//! Provider descriptors and runtime status.

use serde::{Deserialize, Serialize};

/// Static facts about a provider variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub id: String,
    pub display_name: String,
    pub requires_credential: bool,
    pub supports_vision: bool,
    /// Context window in tokens.
    pub context_window: u32,
}

impl ProviderDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            requires_credential: false,
            supports_vision: true,
            context_window: 8_192,
        }
    }

    pub fn with_credential(mut self) -> Self {
        self.requires_credential = true;
        self
    }

    pub fn with_vision(mut self, supports_vision: bool) -> Self {
        self.supports_vision = supports_vision;
        self
    }

    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = tokens;
        self
    }
}

/// Runtime status, computed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub configured: bool,
    pub available: bool,
}

impl ProviderStatus {
    pub fn new(configured: bool, available: bool) -> Self {
        Self {
            configured,
            available,
        }
    }

    pub fn ready(&self) -> bool {
        self.configured && self.available
    }
}
