//! Channel tuning.

use std::time::Duration;

/// Host-side request table settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// Requests planned at the same time. Others wait their turn.
    pub max_concurrent: usize,

    /// How long finished requests stay pollable.
    pub retention: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 1,
            retention: Duration::from_secs(300),
        }
    }
}

/// Caller-side polling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            timeout: Duration::from_millis(120_000),
        }
    }
}
