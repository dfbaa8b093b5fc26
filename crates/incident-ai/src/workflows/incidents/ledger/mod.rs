mod views;

pub use views::{ChartEntry, DashboardSummary};

use super::domain::{IncidentRecord, MAX_SEVERITY};
use super::reference::ReferenceData;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SAMPLE_INCIDENTS: &str = include_str!("../../../../data/sample_incidents.csv");

/// Severity at or above which an incident counts as high severity.
const HIGH_SEVERITY_THRESHOLD: u8 = 7;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("failed to read incident ledger: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid incident CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("incident {id} has unparseable {field} '{value}'")]
    Timestamp {
        id: String,
        field: &'static str,
        value: String,
    },
}

/// Read-only collection of historical incidents backing the dashboard.
#[derive(Debug, Clone, Default)]
pub struct IncidentLedger {
    incidents: Vec<IncidentRecord>,
}

impl IncidentLedger {
    /// The bundled May 2025 incident sample.
    pub fn sample() -> Result<Self, LedgerError> {
        Self::from_reader(SAMPLE_INCIDENTS.as_bytes())
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LedgerError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut incidents = Vec::new();

        for record in csv_reader.deserialize::<IncidentRow>() {
            incidents.push(record?.into_record()?);
        }

        Ok(Self { incidents })
    }

    pub fn incidents(&self) -> &[IncidentRecord] {
        &self.incidents
    }

    pub fn by_taluk<'a>(&'a self, taluk_id: &'a str) -> impl Iterator<Item = &'a IncidentRecord> {
        self.filtered(Some(taluk_id), None)
    }

    pub fn by_type<'a>(
        &'a self,
        incident_type_id: &'a str,
    ) -> impl Iterator<Item = &'a IncidentRecord> {
        self.filtered(None, Some(incident_type_id))
    }

    /// Incidents matching every filter that is set; `None` matches anything.
    pub fn filtered<'a>(
        &'a self,
        taluk_id: Option<&'a str>,
        incident_type_id: Option<&'a str>,
    ) -> impl Iterator<Item = &'a IncidentRecord> {
        self.incidents.iter().filter(move |incident| {
            taluk_id.map_or(true, |taluk| incident.taluk == taluk)
                && incident_type_id.map_or(true, |kind| incident.incident_type == kind)
        })
    }

    /// Incident counts per taluk, in reference order, zero counts included.
    pub fn distribution_by_taluk(&self, reference: &ReferenceData) -> Vec<ChartEntry> {
        let counts = count_by(&self.incidents, |incident| incident.taluk.as_str());
        reference
            .taluks()
            .iter()
            .map(|taluk| ChartEntry::new(&taluk.name, counts.get(taluk.id.as_str()).copied()))
            .collect()
    }

    pub fn distribution_by_type(&self, reference: &ReferenceData) -> Vec<ChartEntry> {
        let counts = count_by(&self.incidents, |incident| incident.incident_type.as_str());
        reference
            .incident_types()
            .iter()
            .map(|kind| ChartEntry::new(&kind.name, counts.get(kind.id.as_str()).copied()))
            .collect()
    }

    /// Mean resolution minutes per incident type, rounded; types without
    /// incidents report zero.
    pub fn resolution_time_by_type(&self, reference: &ReferenceData) -> Vec<ChartEntry> {
        let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
        for incident in &self.incidents {
            let entry = totals.entry(incident.incident_type.as_str()).or_default();
            entry.0 += u64::from(incident.resolution_minutes);
            entry.1 += 1;
        }

        reference
            .incident_types()
            .iter()
            .map(|kind| {
                let average = totals
                    .get(kind.id.as_str())
                    .map(|(sum, count)| (*sum as f64 / *count as f64).round() as u64);
                ChartEntry::new(&kind.name, average)
            })
            .collect()
    }

    /// Ten buckets, one per severity score; out-of-range scores land in the
    /// nearest bucket.
    pub fn severity_distribution(&self) -> Vec<u64> {
        let mut buckets = vec![0u64; usize::from(MAX_SEVERITY)];
        for incident in &self.incidents {
            let index = usize::from(incident.severity.clamp(1, MAX_SEVERITY) - 1);
            buckets[index] += 1;
        }
        buckets
    }

    pub fn summary(&self, reference: &ReferenceData) -> DashboardSummary {
        let total = self.incidents.len();
        let resolved = self
            .incidents
            .iter()
            .filter(|incident| incident.is_resolved())
            .count();
        let critical = self
            .incidents
            .iter()
            .filter(|incident| incident.severity > 8)
            .count();
        let high_severity = self
            .incidents
            .iter()
            .filter(|incident| incident.severity >= HIGH_SEVERITY_THRESHOLD)
            .count();
        let resolution_rate_percent = if total == 0 {
            0
        } else {
            ((resolved as f64 / total as f64) * 100.0).round() as u64
        };

        let (average_resolution_minutes, average_severity) = if total == 0 {
            (0, 0.0)
        } else {
            let minutes: u64 = self
                .incidents
                .iter()
                .map(|incident| u64::from(incident.resolution_minutes))
                .sum();
            let severity: u64 = self
                .incidents
                .iter()
                .map(|incident| u64::from(incident.severity))
                .sum();
            (
                (minutes as f64 / total as f64).round() as u64,
                ((severity as f64 / total as f64) * 100.0).round() / 100.0,
            )
        };

        DashboardSummary {
            total_incidents: total,
            resolved_incidents: resolved,
            critical_incidents: critical,
            high_severity_incidents: high_severity,
            resolution_rate_percent,
            average_resolution_minutes,
            average_severity,
            by_taluk: self.distribution_by_taluk(reference),
            by_type: self.distribution_by_type(reference),
            resolution_time_by_type: self.resolution_time_by_type(reference),
            severity_distribution: self.severity_distribution(),
        }
    }
}

fn count_by<'a, F>(incidents: &'a [IncidentRecord], key: F) -> HashMap<&'a str, u64>
where
    F: Fn(&'a IncidentRecord) -> &'a str,
{
    let mut counts = HashMap::new();
    for incident in incidents {
        *counts.entry(key(incident)).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Deserialize)]
struct IncidentRow {
    id: String,
    incident_type: String,
    taluk: String,
    reported_at: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    resolved_at: Option<String>,
    severity: u8,
    resolution_minutes: u32,
    #[serde(default)]
    description: String,
}

impl IncidentRow {
    fn into_record(self) -> Result<IncidentRecord, LedgerError> {
        let reported_at =
            parse_datetime(&self.reported_at).ok_or_else(|| LedgerError::Timestamp {
                id: self.id.clone(),
                field: "reported_at",
                value: self.reported_at.clone(),
            })?;
        let resolved_at = match self.resolved_at.as_deref() {
            Some(raw) => Some(parse_datetime(raw).ok_or_else(|| LedgerError::Timestamp {
                id: self.id.clone(),
                field: "resolved_at",
                value: raw.to_string(),
            })?),
            None => None,
        };

        Ok(IncidentRecord {
            id: self.id,
            incident_type: self.incident_type,
            taluk: self.taluk,
            reported_at,
            resolved_at,
            severity: self.severity,
            resolution_minutes: self.resolution_minutes,
            description: self.description,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
