pub mod assessment;
pub mod gemini;
pub mod incidents;
