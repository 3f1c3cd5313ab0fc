//! Action validation errors.

use thiserror::Error;

/// Raised when a provider returns an action that does not match the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Invalid action: {0}")]
    Invalid(String),

    #[error("Invalid action at index {index}: {reason}")]
    InvalidInBatch { index: usize, reason: String },
}

impl ActionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    /// Human-readable reason without the batch position.
    pub fn reason(&self) -> &str {
        match self {
            Self::Invalid(reason) => reason,
            Self::InvalidInBatch { reason, .. } => reason,
        }
    }

    /// Attach the position of the offending entry within a batch.
    pub fn at_index(self, index: usize) -> Self {
        match self {
            Self::Invalid(reason) | Self::InvalidInBatch { reason, .. } => {
                Self::InvalidInBatch { index, reason }
            }
        }
    }
}
