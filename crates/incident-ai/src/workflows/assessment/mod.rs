//! AI-backed incident assessment: severity prediction from a description and
//! before/after image comparison.
//!
//! Replies from the generator are free text. The parsers here accept the
//! shapes the service has been seen to produce and reject everything else
//! with the raw text attached.

pub mod comparison;
pub mod error;
pub mod image;
mod prompts;
pub mod router;
pub mod service;
pub mod severity;

pub use comparison::{extract_comparison, parse_image_comparison, ExtractionStrategy};
pub use error::{AssessmentError, ImageSide, ValidationIssue};
pub use image::{encode_data_url, ImageFormat, ImagePayload};
pub use router::{assessment_router, SeverityPredictionView, SeveritySource};
pub use service::AssessmentService;
pub use severity::{parse_severity_score, AiSeverityScore};
