//! Incident reference data, local severity and resolution-time heuristics,
//! and the historical ledger behind the analytics dashboard.

pub mod domain;
pub mod estimation;
pub mod ledger;
pub mod reference;
pub mod router;

pub use domain::{
    format_minutes, ImageComparisonResult, IncidentRecord, IncidentTypeRef, ResolutionEstimate,
    Season, SeverityBand, SeverityEstimate, SeverityLevel, TalukRef,
};
pub use estimation::IncidentEstimator;
pub use ledger::{ChartEntry, DashboardSummary, IncidentLedger, LedgerError};
pub use reference::{ReferenceData, ReferenceDataError, ReferenceLookupMiss};
pub use router::{incident_router, IncidentAnalytics};
