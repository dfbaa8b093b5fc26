use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::assessment::AssessmentError;
use crate::workflows::gemini::GenerationError;
use crate::workflows::incidents::{LedgerError, ReferenceDataError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Reference(ReferenceDataError),
    Ledger(LedgerError),
    Assessment(AssessmentError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Reference(err) => write!(f, "reference data error: {}", err),
            AppError::Ledger(err) => write!(f, "incident ledger error: {}", err),
            AppError::Assessment(err) => write!(f, "assessment error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Reference(err) => Some(err),
            AppError::Ledger(err) => Some(err),
            AppError::Assessment(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Assessment(AssessmentError::Validation { .. }) => StatusCode::BAD_REQUEST,
            AppError::Assessment(AssessmentError::Upstream(GenerationError::NotConfigured)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Assessment(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Reference(_)
            | AppError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ReferenceDataError> for AppError {
    fn from(value: ReferenceDataError) -> Self {
        Self::Reference(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<AssessmentError> for AppError {
    fn from(value: AssessmentError) -> Self {
        Self::Assessment(value)
    }
}

impl From<GenerationError> for AppError {
    fn from(value: GenerationError) -> Self {
        Self::Assessment(AssessmentError::Upstream(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::{ImageSide, ValidationIssue};

    #[test]
    fn assessment_errors_map_to_http_statuses() {
        let validation = AppError::from(AssessmentError::Validation {
            side: ImageSide::Before,
            issue: ValidationIssue::InvalidBase64,
        });
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);

        let unconfigured = AppError::from(GenerationError::NotConfigured);
        assert_eq!(
            unconfigured.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );

        let unreadable = AppError::from(GenerationError::EmptyResponse);
        assert_eq!(unreadable.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn startup_errors_are_internal() {
        let err = AppError::from(ReferenceDataError::Empty("taluk"));
        assert!(err.to_string().starts_with("reference data error"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
