//! Local Ollama action provider for deskpilot.
//!
//! Nothing leaves the machine and no key is needed. A vision model such as
//! `llava` must be installed.

mod api;
mod models;
mod provider;

pub use models::{is_vision_model, VISION_MODEL_FAMILIES};
pub use provider::OllamaProvider;
