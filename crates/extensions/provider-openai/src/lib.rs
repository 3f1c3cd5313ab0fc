//! OpenAI action provider for deskpilot.

mod api;
mod converter;
mod provider;

pub use provider::OpenAIProvider;
