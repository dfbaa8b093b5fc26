mod rules;

use super::domain::{
    ResolutionEstimate, Season, SeverityEstimate, DEFAULT_RESOLUTION_MINUTES, DEFAULT_SEVERITY,
};
use super::reference::ReferenceData;
use std::sync::Arc;
use tracing::debug;

/// Stateless heuristic estimator over the injected reference tables.
///
/// Every operation is total: reference misses resolve to the documented
/// defaults (severity 5, 240 minutes) instead of failing.
#[derive(Debug, Clone)]
pub struct IncidentEstimator {
    reference: Arc<ReferenceData>,
}

impl IncidentEstimator {
    pub fn new(reference: Arc<ReferenceData>) -> Self {
        Self { reference }
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    /// Baseline severity of the incident type scaled by the taluk factor,
    /// rounded and clamped to 1-10.
    pub fn estimate_severity(&self, incident_type_id: &str, taluk_id: &str) -> u8 {
        let lookup = self
            .reference
            .incident_type(incident_type_id)
            .and_then(|kind| Ok((kind, self.reference.taluk(taluk_id)?)));

        match lookup {
            Ok((kind, taluk)) => {
                rules::adjusted_severity(kind.baseline_severity, taluk.severity_factor)
            }
            Err(miss) => {
                debug!(%miss, "severity estimate fell back to default");
                DEFAULT_SEVERITY
            }
        }
    }

    pub fn severity_estimate(&self, incident_type_id: &str, taluk_id: &str) -> SeverityEstimate {
        SeverityEstimate {
            score: self.estimate_severity(incident_type_id, taluk_id),
            explanation: None,
        }
    }

    /// Taluk average resolution time scaled by the severity band.
    pub fn estimate_resolution_minutes(
        &self,
        incident_type_id: &str,
        taluk_id: &str,
        severity: u8,
    ) -> u32 {
        self.resolution_for_season(incident_type_id, taluk_id, severity, None)
            .0
    }

    /// Same as [`Self::estimate_resolution_minutes`] with the seasonal
    /// multiplier for `month` (1-12) applied on top.
    pub fn estimate_resolution_minutes_in_month(
        &self,
        incident_type_id: &str,
        taluk_id: &str,
        severity: u8,
        month: u32,
    ) -> u32 {
        self.resolution_for_season(
            incident_type_id,
            taluk_id,
            severity,
            Some(Season::for_month(month)),
        )
        .0
    }

    pub fn resolution_estimate(
        &self,
        incident_type_id: &str,
        taluk_id: &str,
        severity: u8,
        month: Option<u32>,
    ) -> ResolutionEstimate {
        let season = month.map(Season::for_month);
        let (minutes, referenced) =
            self.resolution_for_season(incident_type_id, taluk_id, severity, season);

        ResolutionEstimate {
            minutes,
            confidence: if referenced {
                rules::REFERENCED_CONFIDENCE
            } else {
                rules::DEFAULTED_CONFIDENCE
            },
        }
    }

    fn resolution_for_season(
        &self,
        incident_type_id: &str,
        taluk_id: &str,
        severity: u8,
        season: Option<Season>,
    ) -> (u32, bool) {
        let lookup = self
            .reference
            .incident_type(incident_type_id)
            .and_then(|_| self.reference.taluk(taluk_id));

        match lookup {
            Ok(taluk) => (
                rules::resolution_minutes(taluk.average_resolution_minutes, severity, season),
                true,
            ),
            Err(miss) => {
                debug!(%miss, "resolution estimate fell back to default");
                (rules::seasonal_only(DEFAULT_RESOLUTION_MINUTES, season), false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::incidents::domain::{IncidentTypeRef, TalukRef};

    fn estimator() -> IncidentEstimator {
        IncidentEstimator::new(Arc::new(ReferenceData::standard()))
    }

    #[test]
    fn unknown_ids_use_default_severity() {
        let estimator = estimator();
        assert_eq!(estimator.estimate_severity("meteor", "mangalore"), 5);
        assert_eq!(estimator.estimate_severity("fire", "atlantis"), 5);
        assert_eq!(estimator.estimate_severity("", ""), 5);
    }

    #[test]
    fn unknown_ids_use_default_resolution() {
        let estimator = estimator();
        assert_eq!(estimator.estimate_resolution_minutes("meteor", "puttur", 9), 240);
        assert_eq!(estimator.estimate_resolution_minutes("fire", "atlantis", 2), 240);
        let estimate = estimator.resolution_estimate("fire", "atlantis", 2, Some(7));
        assert_eq!(estimate.minutes, 312);
        assert_eq!(estimate.confidence, rules::DEFAULTED_CONFIDENCE);
    }

    #[test]
    fn severity_estimate_has_no_explanation() {
        let estimate = estimator().severity_estimate("fire", "belthangady");
        assert_eq!(estimate.score, 10);
        assert!(estimate.explanation.is_none());
    }

    #[test]
    fn resolution_estimate_reports_reference_confidence() {
        let estimate = estimator().resolution_estimate("power-outage", "puttur", 9, None);
        assert_eq!(estimate.minutes, 264);
        assert_eq!(estimate.confidence, rules::REFERENCED_CONFIDENCE);
    }

    #[test]
    fn uses_injected_fixture_tables() {
        let reference = ReferenceData::new(
            vec![IncidentTypeRef {
                id: "landslide".to_string(),
                name: "Landslide".to_string(),
                baseline_severity: 4,
            }],
            vec![TalukRef {
                id: "sullia".to_string(),
                name: "Sullia".to_string(),
                average_resolution_minutes: 100.0,
                severity_factor: 2.0,
            }],
        )
        .expect("fixture is valid");
        let estimator = IncidentEstimator::new(Arc::new(reference));

        assert_eq!(estimator.estimate_severity("landslide", "sullia"), 8);
        assert_eq!(estimator.estimate_resolution_minutes("landslide", "sullia", 8), 100);
        assert_eq!(estimator.estimate_severity("fire", "sullia"), 5);
    }
}
