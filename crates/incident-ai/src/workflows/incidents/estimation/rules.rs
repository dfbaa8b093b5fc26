use super::super::domain::{Season, SeverityBand, MAX_SEVERITY, MIN_SEVERITY};

/// Confidence reported when both reference rows were found. Sits at the
/// middle of the 70-90 band the dashboard historically displayed.
pub(crate) const REFERENCED_CONFIDENCE: u8 = 80;
/// Confidence reported when the estimate fell back to defaults.
pub(crate) const DEFAULTED_CONFIDENCE: u8 = 50;

pub(crate) fn adjusted_severity(baseline: u8, severity_factor: f64) -> u8 {
    let scaled = (f64::from(baseline) * severity_factor).round();
    scaled.clamp(f64::from(MIN_SEVERITY), f64::from(MAX_SEVERITY)) as u8
}

/// Applies the severity band, then the optional season, rounding after each
/// step so a seasonal figure is always the rounded product of the plain one.
pub(crate) fn resolution_minutes(base_minutes: f64, severity: u8, season: Option<Season>) -> u32 {
    let band = SeverityBand::from_score(severity);
    let unadjusted = (base_minutes * band.resolution_multiplier()).round();
    let adjusted = match season {
        Some(season) => (unadjusted * season.multiplier()).round(),
        None => unadjusted,
    };
    to_minutes(adjusted)
}

pub(crate) fn seasonal_only(minutes: u32, season: Option<Season>) -> u32 {
    match season {
        Some(season) => to_minutes((f64::from(minutes) * season.multiplier()).round()),
        None => minutes.max(1),
    }
}

fn to_minutes(value: f64) -> u32 {
    value.clamp(1.0, f64::from(u32::MAX)) as u32
}
