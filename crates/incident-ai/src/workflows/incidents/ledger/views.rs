use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartEntry {
    pub name: String,
    pub value: u64,
}

impl ChartEntry {
    pub(crate) fn new(name: &str, value: Option<u64>) -> Self {
        Self {
            name: name.to_string(),
            value: value.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_incidents: usize,
    pub resolved_incidents: usize,
    pub critical_incidents: usize,
    pub high_severity_incidents: usize,
    /// Resolved share of all incidents, rounded to a whole percent.
    pub resolution_rate_percent: u64,
    pub average_resolution_minutes: u64,
    pub average_severity: f64,
    pub by_taluk: Vec<ChartEntry>,
    pub by_type: Vec<ChartEntry>,
    pub resolution_time_by_type: Vec<ChartEntry>,
    pub severity_distribution: Vec<u64>,
}
