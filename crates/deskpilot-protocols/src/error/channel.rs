//! Async request channel errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("Request not found: {0}")]
    NotFound(String),

    #[error("Request {request_id} timed out after {waited_ms} ms")]
    Timeout { request_id: String, waited_ms: u64 },

    #[error("Request {0} was cancelled")]
    Cancelled(String),

    #[error("Host error: {0}")]
    Host(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A well-framed message whose body could not be decoded. The stream
    /// is still aligned on the next frame.
    #[error("Invalid message: {0}")]
    InvalidMessage(String),
}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
