use super::error::AssessmentError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

pub const MIN_AI_SCORE: u8 = 1;
pub const MAX_AI_SCORE: u8 = 5;

static SCORE_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\{\s*"score"\s*:\s*-?\d+(?:\.\d+)?\s*,\s*"explanation"\s*:\s*"(?:[^"\\]|\\.)*"\s*\}"#,
    )
    .expect("valid score object regex")
});

/// Severity on the generator's 1-5 rubric with its one-line rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSeverityScore {
    pub score: u8,
    pub explanation: String,
}

impl AiSeverityScore {
    /// Maps the 1-5 rubric onto the dashboard's 1-10 scale.
    pub fn scaled_to_ten(&self) -> u8 {
        self.score.saturating_mul(2)
    }
}

/// Extracts `{"score": n, "explanation": "..."}` from free-form text.
///
/// The first matching object wins; surrounding prose is ignored. The score is
/// rounded and clamped to 1-5. Anything else is a parse error carrying the
/// raw text.
pub fn parse_severity_score(text: &str) -> Result<AiSeverityScore, AssessmentError> {
    const OPERATION: &str = "severity";

    let candidate = SCORE_OBJECT
        .find(text)
        .ok_or_else(|| AssessmentError::parse(OPERATION, "no score object found", text))?;

    let value: Value = serde_json::from_str(candidate.as_str())
        .map_err(|err| AssessmentError::parse(OPERATION, err.to_string(), text))?;

    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| AssessmentError::parse(OPERATION, "score is not numeric", text))?;
    let explanation = value
        .get("explanation")
        .and_then(Value::as_str)
        .ok_or_else(|| AssessmentError::parse(OPERATION, "explanation is not text", text))?;

    let score = score
        .round()
        .clamp(f64::from(MIN_AI_SCORE), f64::from(MAX_AI_SCORE)) as u8;

    Ok(AiSeverityScore {
        score,
        explanation: explanation.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_scores_above_the_rubric() {
        let parsed =
            parse_severity_score(r#"Some prose {"score": 7, "explanation": "bad"} trailing"#)
                .expect("embedded object parses");
        assert_eq!(parsed.score, 5);
        assert_eq!(parsed.explanation, "bad");
    }

    #[test]
    fn clamps_scores_below_the_rubric() {
        let parsed = parse_severity_score(r#"{"score": 0, "explanation": "trivial"}"#)
            .expect("object parses");
        assert_eq!(parsed.score, 1);
    }

    #[test]
    fn rounds_fractional_scores() {
        let parsed = parse_severity_score(r#"{"score": 3.5, "explanation": "moderate"}"#)
            .expect("object parses");
        assert_eq!(parsed.score, 4);
        assert_eq!(parsed.scaled_to_ten(), 8);
    }

    #[test]
    fn tolerates_code_fences_and_escaped_quotes() {
        let text = "```json\n{\"score\": 4, \"explanation\": \"Road \\\"fully\\\" blocked\"}\n```";
        let parsed = parse_severity_score(text).expect("fenced object parses");
        assert_eq!(parsed.score, 4);
        assert_eq!(parsed.explanation, "Road \"fully\" blocked");
    }

    #[test]
    fn first_matching_object_wins() {
        let text = r#"{"score": 2, "explanation": "first"} {"score": 5, "explanation": "second"}"#;
        assert_eq!(parse_severity_score(text).expect("parses").explanation, "first");
    }

    #[test]
    fn prose_without_object_is_an_error_with_raw_text() {
        let err = parse_severity_score("Severity is probably high").expect_err("no object");
        assert!(matches!(err, AssessmentError::Parse { .. }));
        assert_eq!(err.raw_response(), Some("Severity is probably high"));
    }

    #[test]
    fn quoted_score_is_rejected() {
        let err = parse_severity_score(r#"{"score": "4", "explanation": "x"}"#)
            .expect_err("string score rejected");
        assert_eq!(err.raw_response(), Some(r#"{"score": "4", "explanation": "x"}"#));
    }
}
