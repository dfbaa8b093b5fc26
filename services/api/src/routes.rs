use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use incident_ai::workflows::assessment::{assessment_router, AssessmentService};
use incident_ai::workflows::gemini::GenerationGateway;
use incident_ai::workflows::incidents::{incident_router, IncidentAnalytics};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_incident_routes<G>(
    analytics: Arc<IncidentAnalytics>,
    assessment: Arc<AssessmentService<G>>,
) -> axum::Router
where
    G: GenerationGateway + 'static,
{
    let estimator = analytics.estimator.clone();

    incident_router(analytics)
        .merge(assessment_router(assessment, estimator))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use incident_ai::config::AssessmentConfig;
    use incident_ai::workflows::gemini::{GenerationError, GenerationRequest};
    use incident_ai::workflows::incidents::{IncidentEstimator, IncidentLedger, ReferenceData};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    struct OfflineGateway;

    #[async_trait]
    impl GenerationGateway for OfflineGateway {
        async fn generate(&self, _request: GenerationRequest) -> Result<String, GenerationError> {
            Err(GenerationError::NotConfigured)
        }
    }

    fn app(ready: bool) -> axum::Router {
        let estimator = IncidentEstimator::new(Arc::new(ReferenceData::standard()));
        let ledger = Arc::new(IncidentLedger::sample().expect("sample ledger parses"));
        let analytics = Arc::new(IncidentAnalytics::new(estimator, ledger));
        let assessment = Arc::new(AssessmentService::new(
            Arc::new(OfflineGateway),
            AssessmentConfig::default(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        state.readiness.store(ready, Ordering::Release);

        with_incident_routes(analytics, assessment).layer(Extension(state))
    }

    async fn call(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request builds")
    }

    #[tokio::test]
    async fn readiness_reflects_startup_state() {
        let (status, body) = call(app(false), get("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, body) = call(app(true), get("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn health_and_metrics_respond() {
        let (status, body) = call(app(true), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let response = app(true)
            .oneshot(get("/metrics"))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
    }

    #[tokio::test]
    async fn incident_and_assessment_routes_are_mounted() {
        let (status, body) = call(app(true), get("/api/v1/dashboard/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_incidents"], 15);

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/incidents/severity/predict")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"incident_type": "road-damage", "taluk": "bantwal", "description": "Pothole"})
                    .to_string(),
            ))
            .expect("request builds");
        let (status, body) = call(app(true), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "local_estimate");
        assert_eq!(body["score"], 6);
    }
}
