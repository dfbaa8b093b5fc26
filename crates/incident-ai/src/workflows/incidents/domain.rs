use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;
pub const DEFAULT_SEVERITY: u8 = 5;
pub const DEFAULT_RESOLUTION_MINUTES: u32 = 240;

/// Incident category with its severity before any location adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentTypeRef {
    pub id: String,
    pub name: String,
    pub baseline_severity: u8,
}

/// Taluk (local administrative subdivision) with its resolution profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalukRef {
    pub id: String,
    pub name: String,
    pub average_resolution_minutes: f64,
    pub severity_factor: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityEstimate {
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl SeverityEstimate {
    pub fn level(&self) -> SeverityLevel {
        SeverityLevel::from_score(self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionEstimate {
    pub minutes: u32,
    pub confidence: u8,
}

impl ResolutionEstimate {
    /// Renders the estimate as "2 hours 15 mins" style text.
    pub fn human_duration(&self) -> String {
        format_minutes(self.minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageComparisonResult {
    pub description: String,
    pub resolved: bool,
    pub confidence: f64,
}

/// Priority band on the 1-10 scale driving the resolution-time multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Routine,
    Elevated,
    Urgent,
}

impl SeverityBand {
    pub const fn from_score(severity: u8) -> Self {
        if severity > 8 {
            Self::Urgent
        } else if severity > 5 {
            Self::Elevated
        } else {
            Self::Routine
        }
    }

    /// Urgent incidents get prioritized crews, routine ones wait in queue.
    pub const fn resolution_multiplier(self) -> f64 {
        match self {
            Self::Urgent => 0.8,
            Self::Elevated => 1.0,
            Self::Routine => 1.2,
        }
    }
}

/// Display grouping used by dashboards and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=3 => Self::Low,
            4..=6 => Self::Medium,
            7..=8 => Self::High,
            _ => Self::Critical,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Monsoon,
    Winter,
    Regular,
}

impl Season {
    /// Months are 1-based; anything outside 1..=12 is treated as regular.
    pub const fn for_month(month: u32) -> Self {
        match month {
            6..=9 => Self::Monsoon,
            12 | 1 | 2 => Self::Winter,
            _ => Self::Regular,
        }
    }

    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Monsoon => 1.3,
            Self::Winter => 1.1,
            Self::Regular => 1.0,
        }
    }
}

/// Historical incident as shown on the analytics dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub id: String,
    pub incident_type: String,
    pub taluk: String,
    pub reported_at: NaiveDateTime,
    pub resolved_at: Option<NaiveDateTime>,
    pub severity: u8,
    pub resolution_minutes: u32,
    pub description: String,
}

impl IncidentRecord {
    pub fn is_resolved(&self) -> bool {
        self.resolved_at.is_some()
    }
}

pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    let plural = |count: u32| if count == 1 { "" } else { "s" };

    match (hours, mins) {
        (0, mins) => format!("{mins} minute{}", plural(mins)),
        (hours, 0) => format!("{hours} hour{}", plural(hours)),
        (hours, mins) => format!(
            "{hours} hour{} {mins} min{}",
            plural(hours),
            plural(mins)
        ),
    }
}
