//! Ollama HTTP API types.

use serde::{Deserialize, Serialize};

/// `GET /api/tags` reply.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

/// `POST /api/generate` body.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub stream: bool,
    pub format: String,
    pub options: GenerateOptions,
}

#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    pub temperature: f32,
}

/// `POST /api/generate` reply with `stream: false`.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

/// `{"error": "..."}` returned on failure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
