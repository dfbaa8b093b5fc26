use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{format_minutes, IncidentRecord, SeverityLevel, MAX_SEVERITY, MIN_SEVERITY};
use super::estimation::IncidentEstimator;
use super::ledger::IncidentLedger;

/// Local estimation and dashboard state shared by the incident endpoints.
#[derive(Debug, Clone)]
pub struct IncidentAnalytics {
    pub estimator: IncidentEstimator,
    pub ledger: Arc<IncidentLedger>,
}

impl IncidentAnalytics {
    pub fn new(estimator: IncidentEstimator, ledger: Arc<IncidentLedger>) -> Self {
        Self { estimator, ledger }
    }
}

/// Router builder exposing reference data, local estimates and dashboards.
pub fn incident_router(analytics: Arc<IncidentAnalytics>) -> Router {
    Router::new()
        .route("/api/v1/reference", get(reference_handler))
        .route("/api/v1/incidents", get(incidents_handler))
        .route("/api/v1/incidents/severity", post(severity_handler))
        .route("/api/v1/incidents/resolution", post(resolution_handler))
        .route("/api/v1/dashboard/summary", get(dashboard_handler))
        .with_state(analytics)
}

#[derive(Debug, Deserialize)]
pub struct SeverityRequest {
    pub incident_type: String,
    pub taluk: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SeverityView {
    pub score: u8,
    pub level: SeverityLevel,
}

#[derive(Debug, Deserialize)]
pub struct ResolutionRequest {
    pub incident_type: String,
    pub taluk: String,
    #[serde(default)]
    pub severity: Option<u8>,
    /// Calendar month 1-12 for the seasonal adjustment.
    #[serde(default)]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResolutionView {
    pub severity: u8,
    pub minutes: u32,
    pub confidence: u8,
    pub human_duration: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct IncidentFilter {
    pub taluk: Option<String>,
    pub incident_type: Option<String>,
}

async fn reference_handler(State(analytics): State<Arc<IncidentAnalytics>>) -> Response {
    let reference = analytics.estimator.reference();
    let payload = json!({
        "incident_types": reference.incident_types(),
        "taluks": reference.taluks(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

async fn incidents_handler(
    State(analytics): State<Arc<IncidentAnalytics>>,
    Query(filter): Query<IncidentFilter>,
) -> Response {
    let incidents: Vec<&IncidentRecord> = analytics
        .ledger
        .filtered(filter.taluk.as_deref(), filter.incident_type.as_deref())
        .collect();

    (StatusCode::OK, axum::Json(incidents)).into_response()
}

async fn severity_handler(
    State(analytics): State<Arc<IncidentAnalytics>>,
    axum::Json(request): axum::Json<SeverityRequest>,
) -> Response {
    let score = analytics
        .estimator
        .estimate_severity(&request.incident_type, &request.taluk);
    let view = SeverityView {
        score,
        level: SeverityLevel::from_score(score),
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

async fn resolution_handler(
    State(analytics): State<Arc<IncidentAnalytics>>,
    axum::Json(request): axum::Json<ResolutionRequest>,
) -> Response {
    if let Some(severity) = request.severity {
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&severity) {
            return unprocessable(format!(
                "severity must be between {MIN_SEVERITY} and {MAX_SEVERITY}"
            ));
        }
    }
    if let Some(month) = request.month {
        if !(1..=12).contains(&month) {
            return unprocessable("month must be between 1 and 12".to_string());
        }
    }

    let estimator = &analytics.estimator;
    let severity = request
        .severity
        .unwrap_or_else(|| estimator.estimate_severity(&request.incident_type, &request.taluk));
    let estimate = estimator.resolution_estimate(
        &request.incident_type,
        &request.taluk,
        severity,
        request.month,
    );

    let view = ResolutionView {
        severity,
        minutes: estimate.minutes,
        confidence: estimate.confidence,
        human_duration: format_minutes(estimate.minutes),
    };
    (StatusCode::OK, axum::Json(view)).into_response()
}

async fn dashboard_handler(State(analytics): State<Arc<IncidentAnalytics>>) -> Response {
    let summary = analytics.ledger.summary(analytics.estimator.reference());
    (StatusCode::OK, axum::Json(summary)).into_response()
}

fn unprocessable(message: String) -> Response {
    let payload = json!({ "error": message });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}
