use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::error::AssessmentError;
use super::service::AssessmentService;
use crate::workflows::gemini::{GenerationError, GenerationGateway};
use crate::workflows::incidents::domain::SeverityLevel;
use crate::workflows::incidents::IncidentEstimator;

/// Room for the JSON envelope and data URL prefixes around the two images.
const COMPARISON_BODY_SLACK: usize = 64 * 1024;

struct AssessmentState<G> {
    service: Arc<AssessmentService<G>>,
    estimator: IncidentEstimator,
}

/// Router builder exposing the AI-backed endpoints.
///
/// The estimator backs the severity fallback when the generator is
/// unavailable or replies with something unreadable.
pub fn assessment_router<G>(
    service: Arc<AssessmentService<G>>,
    estimator: IncidentEstimator,
) -> Router
where
    G: GenerationGateway + 'static,
{
    let body_limit = comparison_body_limit(service.max_image_bytes());
    let state = Arc::new(AssessmentState { service, estimator });

    Router::new()
        .route(
            "/api/v1/incidents/severity/predict",
            post(predict_severity_handler::<G>),
        )
        .route(
            "/api/v1/incidents/images/compare",
            post(compare_images_handler::<G>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Largest comparison body accepted: two base64 images at the decoded size
/// cap plus envelope slack.
fn comparison_body_limit(max_image_bytes: usize) -> usize {
    let encoded = max_image_bytes.div_ceil(3).saturating_mul(4);
    encoded
        .saturating_mul(2)
        .saturating_add(COMPARISON_BODY_SLACK)
}

#[derive(Debug, Deserialize)]
pub struct SeverityPredictionRequest {
    pub incident_type: String,
    pub taluk: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeveritySource {
    Ai,
    LocalEstimate,
}

/// Severity on the 1-10 scale plus where it came from.
#[derive(Debug, Serialize, Deserialize)]
pub struct SeverityPredictionView {
    pub score: u8,
    pub level: SeverityLevel,
    pub source: SeveritySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageComparisonRequest {
    pub before_image: String,
    pub after_image: String,
}

async fn predict_severity_handler<G>(
    State(state): State<Arc<AssessmentState<G>>>,
    axum::Json(request): axum::Json<SeverityPredictionRequest>,
) -> Response
where
    G: GenerationGateway + 'static,
{
    if request.description.trim().is_empty() {
        let view = local_prediction(&state.estimator, &request, None);
        return (StatusCode::OK, axum::Json(view)).into_response();
    }

    let reference = state.estimator.reference();
    let type_name = reference.incident_type_name(&request.incident_type);
    let taluk_name = reference.taluk_name(&request.taluk);

    let view = match state
        .service
        .predict_severity(type_name, &request.description, taluk_name)
        .await
    {
        Ok(ai) => {
            let score = ai.scaled_to_ten();
            SeverityPredictionView {
                score,
                level: SeverityLevel::from_score(score),
                source: SeveritySource::Ai,
                explanation: Some(ai.explanation),
                ai_error: None,
            }
        }
        Err(err) => {
            warn!(error = %err, "AI severity unavailable, using local estimate");
            local_prediction(&state.estimator, &request, Some(err.to_string()))
        }
    };

    (StatusCode::OK, axum::Json(view)).into_response()
}

async fn compare_images_handler<G>(
    State(state): State<Arc<AssessmentState<G>>>,
    axum::Json(request): axum::Json<ImageComparisonRequest>,
) -> Response
where
    G: GenerationGateway + 'static,
{
    match state
        .service
        .compare_images(&request.before_image, &request.after_image)
        .await
    {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(AssessmentError::Validation { side, issue }) => {
            let payload = json!({
                "error": issue.to_string(),
                "image": side.label(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (upstream_status(&other), axum::Json(payload)).into_response()
        }
    }
}

fn local_prediction(
    estimator: &IncidentEstimator,
    request: &SeverityPredictionRequest,
    ai_error: Option<String>,
) -> SeverityPredictionView {
    let score = estimator.estimate_severity(&request.incident_type, &request.taluk);
    SeverityPredictionView {
        score,
        level: SeverityLevel::from_score(score),
        source: SeveritySource::LocalEstimate,
        explanation: None,
        ai_error,
    }
}

fn upstream_status(error: &AssessmentError) -> StatusCode {
    match error {
        AssessmentError::Validation { .. } => StatusCode::BAD_REQUEST,
        AssessmentError::Upstream(GenerationError::NotConfigured) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        AssessmentError::Parse { .. } | AssessmentError::Upstream(_) => StatusCode::BAD_GATEWAY,
    }
}
