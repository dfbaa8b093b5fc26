use super::domain::{IncidentTypeRef, TalukRef, MAX_SEVERITY, MIN_SEVERITY};
use crate::config::ReferenceSources;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read-only lookup tables for incident types and taluks.
///
/// Built once at start-up and shared behind an `Arc`; nothing mutates it
/// afterwards. Tests construct alternate fixtures through [`ReferenceData::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    incident_types: Vec<IncidentTypeRef>,
    taluks: Vec<TalukRef>,
}

/// A reference lookup that missed. Resolved with documented defaults by the
/// estimator and never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceLookupMiss {
    IncidentType(String),
    Taluk(String),
}

impl std::fmt::Display for ReferenceLookupMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceLookupMiss::IncidentType(id) => write!(f, "unknown incident type '{id}'"),
            ReferenceLookupMiss::Taluk(id) => write!(f, "unknown taluk '{id}'"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("failed to read reference table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid reference CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("duplicate {table} id '{id}'")]
    DuplicateId { table: &'static str, id: String },
    #[error("incident type '{id}' has baseline severity {value}, expected 1-10")]
    BaselineOutOfRange { id: String, value: u8 },
    #[error("taluk '{id}' has non-positive {field} ({value})")]
    NonPositive {
        id: String,
        field: &'static str,
        value: f64,
    },
    #[error("{0} table is empty")]
    Empty(&'static str),
}

impl ReferenceData {
    pub fn new(
        incident_types: Vec<IncidentTypeRef>,
        taluks: Vec<TalukRef>,
    ) -> Result<Self, ReferenceDataError> {
        validate_incident_types(&incident_types)?;
        validate_taluks(&taluks)?;
        Ok(Self {
            incident_types,
            taluks,
        })
    }

    /// Built-in tables for the Dakshina Kannada district deployment.
    pub fn standard() -> Self {
        Self {
            incident_types: standard_incident_types(),
            taluks: standard_taluks(),
        }
    }

    /// Loads whichever tables are configured from CSV, keeping the built-in
    /// table for the other.
    pub fn load(sources: &ReferenceSources) -> Result<Self, ReferenceDataError> {
        let incident_types = match &sources.incident_types_csv {
            Some(path) => read_incident_types(open(path)?)?,
            None => standard_incident_types(),
        };
        let taluks = match &sources.taluks_csv {
            Some(path) => read_taluks(open(path)?)?,
            None => standard_taluks(),
        };
        Self::new(incident_types, taluks)
    }

    pub fn from_readers<T: Read, L: Read>(
        incident_types: T,
        taluks: L,
    ) -> Result<Self, ReferenceDataError> {
        Self::new(read_incident_types(incident_types)?, read_taluks(taluks)?)
    }

    pub fn incident_types(&self) -> &[IncidentTypeRef] {
        &self.incident_types
    }

    pub fn taluks(&self) -> &[TalukRef] {
        &self.taluks
    }

    pub fn incident_type(&self, id: &str) -> Result<&IncidentTypeRef, ReferenceLookupMiss> {
        self.incident_types
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ReferenceLookupMiss::IncidentType(id.to_string()))
    }

    pub fn taluk(&self, id: &str) -> Result<&TalukRef, ReferenceLookupMiss> {
        self.taluks
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| ReferenceLookupMiss::Taluk(id.to_string()))
    }

    /// Display name for an incident type id, or the id itself when unknown.
    pub fn incident_type_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.incident_type(id)
            .map(|entry| entry.name.as_str())
            .unwrap_or(id)
    }

    pub fn taluk_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.taluk(id).map(|entry| entry.name.as_str()).unwrap_or(id)
    }
}

fn open(path: &Path) -> Result<File, ReferenceDataError> {
    File::open(path).map_err(|source| ReferenceDataError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, Deserialize)]
struct IncidentTypeRow {
    id: String,
    name: String,
    baseline_severity: u8,
}

#[derive(Debug, Deserialize)]
struct TalukRow {
    id: String,
    name: String,
    average_resolution_minutes: f64,
    severity_factor: f64,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn read_incident_types<R: Read>(reader: R) -> Result<Vec<IncidentTypeRef>, ReferenceDataError> {
    let mut rows = Vec::new();
    for record in csv_reader(reader).deserialize::<IncidentTypeRow>() {
        let row = record?;
        rows.push(IncidentTypeRef {
            id: row.id,
            name: row.name,
            baseline_severity: row.baseline_severity,
        });
    }
    Ok(rows)
}

fn read_taluks<R: Read>(reader: R) -> Result<Vec<TalukRef>, ReferenceDataError> {
    let mut rows = Vec::new();
    for record in csv_reader(reader).deserialize::<TalukRow>() {
        let row = record?;
        rows.push(TalukRef {
            id: row.id,
            name: row.name,
            average_resolution_minutes: row.average_resolution_minutes,
            severity_factor: row.severity_factor,
        });
    }
    Ok(rows)
}

fn validate_incident_types(rows: &[IncidentTypeRef]) -> Result<(), ReferenceDataError> {
    if rows.is_empty() {
        return Err(ReferenceDataError::Empty("incident type"));
    }

    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.id.as_str()) {
            return Err(ReferenceDataError::DuplicateId {
                table: "incident type",
                id: row.id.clone(),
            });
        }
        if !(MIN_SEVERITY..=MAX_SEVERITY).contains(&row.baseline_severity) {
            return Err(ReferenceDataError::BaselineOutOfRange {
                id: row.id.clone(),
                value: row.baseline_severity,
            });
        }
    }
    Ok(())
}

fn validate_taluks(rows: &[TalukRef]) -> Result<(), ReferenceDataError> {
    if rows.is_empty() {
        return Err(ReferenceDataError::Empty("taluk"));
    }

    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.id.as_str()) {
            return Err(ReferenceDataError::DuplicateId {
                table: "taluk",
                id: row.id.clone(),
            });
        }
        // `!(x > 0.0)` also catches NaN.
        if !(row.average_resolution_minutes > 0.0) {
            return Err(ReferenceDataError::NonPositive {
                id: row.id.clone(),
                field: "average_resolution_minutes",
                value: row.average_resolution_minutes,
            });
        }
        if !(row.severity_factor > 0.0) {
            return Err(ReferenceDataError::NonPositive {
                id: row.id.clone(),
                field: "severity_factor",
                value: row.severity_factor,
            });
        }
    }
    Ok(())
}

fn incident_type(id: &str, name: &str, baseline_severity: u8) -> IncidentTypeRef {
    IncidentTypeRef {
        id: id.to_string(),
        name: name.to_string(),
        baseline_severity,
    }
}

fn taluk(id: &str, name: &str, average_resolution_minutes: f64, severity_factor: f64) -> TalukRef {
    TalukRef {
        id: id.to_string(),
        name: name.to_string(),
        average_resolution_minutes,
        severity_factor,
    }
}

fn standard_incident_types() -> Vec<IncidentTypeRef> {
    vec![
        incident_type("water-logging", "Water Logging", 7),
        incident_type("power-outage", "Power Outage", 8),
        incident_type("road-damage", "Road Damage", 6),
        incident_type("fallen-tree", "Fallen Tree", 5),
        incident_type("fire", "Fire", 9),
        incident_type("building-damage", "Building Damage", 8),
        incident_type("medical-emergency", "Medical Emergency", 10),
        incident_type("traffic-signal-failure", "Traffic Signal Failure", 7),
    ]
}

fn standard_taluks() -> Vec<TalukRef> {
    vec![
        taluk("surathkal", "Surathkal", 240.0, 1.2),
        taluk("mulki", "Mulki", 300.0, 1.1),
        taluk("mangalore", "Mangalore", 180.0, 0.8),
        taluk("bantwal", "Bantwal", 270.0, 1.0),
        taluk("puttur", "Puttur", 330.0, 1.3),
        taluk("belthangady", "Belthangady", 360.0, 1.4),
    ]
}
