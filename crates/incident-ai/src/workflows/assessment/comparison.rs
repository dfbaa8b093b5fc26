use super::error::{log_excerpt, AssessmentError};
use crate::workflows::incidents::domain::ImageComparisonResult;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const UNRESOLVED_SENTINEL: &str = "No issue resolved. Forwarded to higher authorities.";

const SENTINEL_CONFIDENCE: f64 = 0.5;
const KEY_VALUE_CONFIDENCE: f64 = 0.8;
const DESCRIPTION_ONLY_CONFIDENCE: f64 = 0.6;

static KEY_VALUE_RESOLVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"resolved:\s*true\s*,").expect("valid resolved regex"));
static KEY_VALUE_DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"description:\s*"([^"]+)""#).expect("valid description regex"));
static LOOSE_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)["']?description["']?\s*:\s*["']([^"']+)["']"#)
        .expect("valid loose description regex")
});
static LOOSE_RESOLVED_TRUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)resolved["']?\s*:\s*true"#).expect("valid loose resolved regex")
});

/// Ways of reading an image-comparison reply, most structured first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    StrictJson,
    LegacySentinel,
    LegacyKeyValue,
    DescriptionOnly,
}

impl ExtractionStrategy {
    pub const ORDERED: [Self; 4] = [
        Self::StrictJson,
        Self::LegacySentinel,
        Self::LegacyKeyValue,
        Self::DescriptionOnly,
    ];

    pub fn attempt(self, text: &str) -> Option<ImageComparisonResult> {
        match self {
            Self::StrictJson => strict_json(text),
            Self::LegacySentinel => sentinel(text),
            Self::LegacyKeyValue => key_value(text),
            Self::DescriptionOnly => description_only(text),
        }
    }
}

/// First strategy in [`ExtractionStrategy::ORDERED`] that accepts the text.
pub fn extract_comparison(text: &str) -> Option<(ExtractionStrategy, ImageComparisonResult)> {
    ExtractionStrategy::ORDERED
        .into_iter()
        .find_map(|strategy| strategy.attempt(text).map(|result| (strategy, result)))
}

pub fn parse_image_comparison(text: &str) -> Result<ImageComparisonResult, AssessmentError> {
    match extract_comparison(text) {
        Some((strategy, result)) => {
            if strategy != ExtractionStrategy::StrictJson {
                debug!(?strategy, "image comparison parsed with a fallback strategy");
            }
            Ok(result)
        }
        None => {
            warn!(
                response = log_excerpt(text, 200),
                "image comparison response matched no extraction strategy"
            );
            Err(AssessmentError::parse(
                "image comparison",
                "response matched no accepted shape",
                text,
            ))
        }
    }
}

fn strict_json(text: &str) -> Option<ImageComparisonResult> {
    let span = first_balanced_object(text)?;
    let value: Value = serde_json::from_str(span).ok()?;

    let resolved = value.get("resolved")?.as_bool()?;
    let description = value.get("description")?.as_str()?;
    let confidence = value.get("confidence")?.as_f64()?;

    Some(ImageComparisonResult {
        description: description.to_string(),
        resolved,
        confidence: confidence.clamp(0.0, 1.0),
    })
}

fn sentinel(text: &str) -> Option<ImageComparisonResult> {
    (text.trim() == UNRESOLVED_SENTINEL).then(|| ImageComparisonResult {
        description: UNRESOLVED_SENTINEL.to_string(),
        resolved: false,
        confidence: SENTINEL_CONFIDENCE,
    })
}

fn key_value(text: &str) -> Option<ImageComparisonResult> {
    if !KEY_VALUE_RESOLVED.is_match(text) {
        return None;
    }
    let description = KEY_VALUE_DESCRIPTION.captures(text)?.get(1)?.as_str();

    Some(ImageComparisonResult {
        description: description.to_string(),
        resolved: true,
        confidence: KEY_VALUE_CONFIDENCE,
    })
}

fn description_only(text: &str) -> Option<ImageComparisonResult> {
    let description = LOOSE_DESCRIPTION.captures(text)?.get(1)?.as_str();

    Some(ImageComparisonResult {
        description: description.to_string(),
        resolved: LOOSE_RESOLVED_TRUE.is_match(text),
        confidence: DESCRIPTION_ONLY_CONFIDENCE,
    })
}

/// Slice from the first `{` to its matching `}`, skipping braces inside JSON
/// string literals.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}
