//! Request status and poll results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of an async request.
///
/// `Pending` moves to exactly one of the terminal states and never
/// changes again. `NotFound` only appears on the wire, for ids the host
/// does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Complete,
    Error,
    Cancelled,
    NotFound,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
            Self::NotFound => "not_found",
        }
    }
}

/// Result of polling a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollResponse {
    pub request_id: String,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PollResponse {
    pub fn new(request_id: impl Into<String>, status: RequestStatus) -> Self {
        Self {
            request_id: request_id.into(),
            status,
            actions: None,
            error: None,
        }
    }

    pub fn not_found(request_id: impl Into<String>) -> Self {
        Self::new(request_id, RequestStatus::NotFound)
    }
}
