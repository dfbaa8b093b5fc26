use std::sync::Arc;

use tracing::{info, warn};

use super::comparison::parse_image_comparison;
use super::error::{log_excerpt, AssessmentError, ImageSide};
use super::image::ImagePayload;
use super::prompts::{severity_prompt, IMAGE_COMPARISON_PROMPT};
use super::severity::{parse_severity_score, AiSeverityScore};
use crate::config::AssessmentConfig;
use crate::workflows::gemini::{GenerationGateway, GenerationRequest};
use crate::workflows::incidents::domain::ImageComparisonResult;

/// AI-backed assessments over a [`GenerationGateway`].
///
/// Each call makes exactly one upstream request and never retries. Falling
/// back to the local estimator on failure is left to the caller.
pub struct AssessmentService<G> {
    gateway: Arc<G>,
    config: AssessmentConfig,
}

impl<G> AssessmentService<G>
where
    G: GenerationGateway + 'static,
{
    pub fn new(gateway: Arc<G>, config: AssessmentConfig) -> Self {
        Self { gateway, config }
    }

    /// Upper bound on the decoded size of a single image.
    pub fn max_image_bytes(&self) -> usize {
        self.config.max_image_bytes
    }

    /// Asks the generator for a 1-5 severity rating of the described incident.
    pub async fn predict_severity(
        &self,
        incident_type: &str,
        description: &str,
        taluk: &str,
    ) -> Result<AiSeverityScore, AssessmentError> {
        let prompt = severity_prompt(incident_type, description, taluk);
        let text = self.gateway.generate(GenerationRequest::text(prompt)).await?;

        let parsed = parse_severity_score(&text).inspect_err(|_| {
            warn!(
                response = log_excerpt(&text, 200),
                "severity response did not contain a score object"
            );
        })?;

        info!(incident_type, taluk, score = parsed.score, "AI severity prediction");
        Ok(parsed)
    }

    /// Judges whether the after image shows the incident addressed.
    pub async fn compare_images(
        &self,
        before: &str,
        after: &str,
    ) -> Result<ImageComparisonResult, AssessmentError> {
        let max_bytes = self.config.max_image_bytes;
        let before = ImagePayload::parse(before, ImageSide::Before, max_bytes)?;
        let after = ImagePayload::parse(after, ImageSide::After, max_bytes)?;

        let request = GenerationRequest::text(IMAGE_COMPARISON_PROMPT)
            .with_image(before.to_inline_image())
            .with_image(after.to_inline_image());
        let text = self.gateway.generate(request).await?;

        let result = parse_image_comparison(&text)?;
        info!(
            resolved = result.resolved,
            confidence = result.confidence,
            "AI image comparison"
        );
        Ok(result)
    }
}
