use crate::workflows::gemini::GenerationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two comparison images a problem refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSide {
    Before,
    After,
}

impl ImageSide {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for ImageSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("image payload is missing")]
    Missing,
    #[error("expected a data:image/<type>;base64,<data> URL")]
    MalformedDataUrl,
    #[error("unsupported image format '{0}', use JPEG or PNG")]
    UnsupportedFormat(String),
    #[error("image data is not valid base64")]
    InvalidBase64,
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
}

/// Failure contract shared by every AI-backed assessment.
///
/// Callers do not need to tell an unreachable service from an unreadable
/// reply; both end up here and both abort the request.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error("invalid {side} image: {issue}")]
    Validation {
        side: ImageSide,
        issue: ValidationIssue,
    },
    #[error("could not parse {operation} response: {reason}")]
    Parse {
        operation: &'static str,
        reason: String,
        raw: String,
    },
    #[error(transparent)]
    Upstream(#[from] GenerationError),
}

impl AssessmentError {
    pub(crate) fn parse(operation: &'static str, reason: impl Into<String>, raw: &str) -> Self {
        Self::Parse {
            operation,
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }

    /// Upstream text that failed to parse, kept for diagnostics.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Parse { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }
}

/// Truncates text for log lines at a character boundary.
pub(crate) fn log_excerpt(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
