//! Action provider errors.

use thiserror::Error;

use super::{ActionError, ChannelError};

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider cannot run yet; the message tells the user what to fix.
    #[error("{0}")]
    NotConfigured(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error(transparent)]
    InvalidAction(#[from] ActionError),

    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl ProviderError {
    pub fn not_configured(remediation: impl Into<String>) -> Self {
        Self::NotConfigured(remediation.into())
    }

    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Whether the same request may succeed if the caller tries again.
    ///
    /// Nothing in the workspace retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend { .. } | Self::MalformedResponse(_) | Self::Network(_) => true,
            Self::Channel(ChannelError::Timeout { .. } | ChannelError::Transport(_)) => true,
            Self::NotConfigured(_) | Self::InvalidAction(_) | Self::Channel(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
