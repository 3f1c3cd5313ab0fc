//! Screen capture, UI inspection and input injection port.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use deskpilot_protocols::Action;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{0} is not supported on this host")]
    Unsupported(&'static str),

    #[error("{0}")]
    Failed(String),
}

/// What the platform layer can do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub screen_capture: bool,
    pub ui_automation: bool,
    pub input_control: bool,
}

/// A captured screen as base64 PNG.
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

/// Platform layer the host drives.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    async fn capture_screen(&self) -> Result<Screenshot, BackendError>;

    /// Accessibility tree of the foreground window.
    async fn inspect_ui(&self) -> Result<Value, BackendError>;

    /// Perform one validated action.
    async fn execute(&self, action: &Action) -> Result<(), BackendError>;
}

/// Backend for platforms without automation support. Reports no
/// capabilities and refuses every operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedBackend;

#[async_trait]
impl AutomationBackend for UnsupportedBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn capture_screen(&self) -> Result<Screenshot, BackendError> {
        Err(BackendError::Unsupported("Screen capture"))
    }

    async fn inspect_ui(&self) -> Result<Value, BackendError> {
        Err(BackendError::Unsupported("UI inspection"))
    }

    async fn execute(&self, _action: &Action) -> Result<(), BackendError> {
        Err(BackendError::Unsupported("Input control"))
    }
}
