use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use tracing::{debug, warn};

use super::types::{GenerateContentRequest, GenerateContentResponse};
use super::{GenerationError, GenerationGateway, GenerationRequest};
use crate::config::GeminiConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `generateContent` client for the Gemini REST API.
///
/// Built without an API key the client still constructs, but every call
/// fails with [`GenerationError::NotConfigured`] so callers can fall back.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("configured", &self.api_key.is_some())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: normalize_model(&config.model),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    fn headers(&self, api_key: &str) -> Result<HeaderMap, GenerationError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key)
            .map_err(|err| GenerationError::Transport(format!("invalid API key header: {err}")))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl GenerationGateway for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::NotConfigured)?;

        debug!(
            model = %self.model,
            images = request.images.len(),
            "sending generateContent request"
        );

        let body = GenerateContentRequest::from(request);
        let response = self
            .http
            .post(self.endpoint())
            .headers(self.headers(api_key)?)
            .json(&body)
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "generateContent returned an error status");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| GenerationError::Decode(err.to_string()))?;

        if let Some(reason) = payload
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.clone())
        {
            return Err(GenerationError::Blocked(reason));
        }

        let finish_reason = payload
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .unwrap_or("unknown");
        debug!(finish_reason, "received generateContent response");

        match payload.text() {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(GenerationError::EmptyResponse),
        }
    }
}

fn normalize_model(model: &str) -> String {
    let trimmed = model.trim().trim_matches('/');
    if trimmed.starts_with("models/") || trimmed.starts_with("tunedModels/") {
        trimmed.to_string()
    } else {
        format!("models/{trimmed}")
    }
}
