//! Boundary to the external text/vision generation service.
//!
//! Assessment code only sees [`GenerationGateway`]; [`GeminiClient`] is the
//! production implementation against Google's `generateContent` REST API.

mod client;
mod types;

pub use client::GeminiClient;

use async_trait::async_trait;

/// Inline image attached to a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub base64_data: String,
}

/// Prompt plus any inline images, sent as a single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub images: Vec<InlineImage>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
        }
    }

    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.images.push(image);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation service is not configured (set GEMINI_API_KEY)")]
    NotConfigured,
    #[error("generation request failed: {0}")]
    Transport(String),
    #[error("generation service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation blocked by the service: {0}")]
    Blocked(String),
    #[error("generation service returned no text")]
    EmptyResponse,
    #[error("unreadable generation payload: {0}")]
    Decode(String),
}

/// Free-text completion service. Returns the raw reply text; callers own all
/// parsing and validation.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError>;
}
