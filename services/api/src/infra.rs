use incident_ai::config::AppConfig;
use incident_ai::error::AppError;
use incident_ai::workflows::assessment::{encode_data_url, AssessmentService};
use incident_ai::workflows::gemini::GeminiClient;
use incident_ai::workflows::incidents::{
    IncidentAnalytics, IncidentEstimator, IncidentLedger, ReferenceData,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the HTTP routes and CLI commands share, built once from config.
pub(crate) struct Services {
    pub(crate) analytics: Arc<IncidentAnalytics>,
    pub(crate) assessment: Arc<AssessmentService<GeminiClient>>,
}

impl Services {
    pub(crate) fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let reference = Arc::new(ReferenceData::load(&config.reference)?);
        let ledger = match &config.ledger_csv {
            Some(path) => IncidentLedger::from_path(path)?,
            None => IncidentLedger::sample()?,
        };
        info!(
            incident_types = reference.incident_types().len(),
            taluks = reference.taluks().len(),
            incidents = ledger.incidents().len(),
            "incident data loaded"
        );

        let gemini = GeminiClient::new(&config.gemini)?;
        if gemini.is_configured() {
            info!(model = gemini.model(), "AI assessments enabled");
        } else {
            info!("GEMINI_API_KEY not set; AI assessments will report the service as unavailable");
        }

        let estimator = IncidentEstimator::new(reference);
        Ok(Self {
            analytics: Arc::new(IncidentAnalytics::new(estimator, Arc::new(ledger))),
            assessment: Arc::new(AssessmentService::new(
                Arc::new(gemini),
                config.assessment,
            )),
        })
    }

    pub(crate) fn estimator(&self) -> &IncidentEstimator {
        &self.analytics.estimator
    }
}

/// Reads an image file into a data URL, guessing the MIME type from the
/// extension.
pub(crate) fn read_image_data_url(path: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(encode_data_url(mime.essence_str(), &bytes))
}

pub(crate) fn parse_month(raw: &str) -> Result<u32, String> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|month| (1..=12).contains(month))
        .ok_or_else(|| format!("'{raw}' is not a month between 1 and 12"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_month_accepts_calendar_months_only() {
        assert_eq!(parse_month("7"), Ok(7));
        assert_eq!(parse_month(" 12 "), Ok(12));
        assert!(parse_month("0").is_err());
        assert!(parse_month("13").is_err());
        assert!(parse_month("July").is_err());
    }

    #[test]
    fn image_files_become_data_urls_by_extension() {
        let path = std::env::temp_dir().join(format!(
            "incident-ai-api-{}-before.png",
            std::process::id()
        ));
        std::fs::write(&path, b"\x89PNG\r\n").expect("temp image written");

        let url = read_image_data_url(&path).expect("image read");
        std::fs::remove_file(&path).ok();

        assert!(url.starts_with("data:image/png;base64,"));
    }
}
