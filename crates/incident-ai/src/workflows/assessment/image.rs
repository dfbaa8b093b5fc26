use super::error::{AssessmentError, ImageSide, ValidationIssue};
use crate::workflows::gemini::InlineImage;
use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

static DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^data:image/([A-Za-z+\-/]+);base64,(.+)$").expect("valid data URL regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// `jpg` is accepted as an alias and sent upstream as `image/jpeg`.
    pub fn from_subtype(subtype: &str) -> Option<Self> {
        match subtype.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }

    pub fn mime(self) -> mime::Mime {
        match self {
            Self::Jpeg => mime::IMAGE_JPEG,
            Self::Png => mime::IMAGE_PNG,
        }
    }
}

/// A validated `data:image/...;base64,...` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub side: ImageSide,
    pub format: ImageFormat,
    base64_data: String,
    decoded_len: usize,
}

impl ImagePayload {
    pub fn parse(data_url: &str, side: ImageSide, max_bytes: usize) -> Result<Self, AssessmentError> {
        let invalid = |issue| AssessmentError::Validation { side, issue };

        let trimmed = data_url.trim();
        if trimmed.is_empty() {
            return Err(invalid(ValidationIssue::Missing));
        }

        let captures = DATA_URL
            .captures(trimmed)
            .ok_or_else(|| invalid(ValidationIssue::MalformedDataUrl))?;
        let subtype = captures[1].to_ascii_lowercase();
        let format = ImageFormat::from_subtype(&subtype)
            .ok_or_else(|| invalid(ValidationIssue::UnsupportedFormat(subtype.clone())))?;

        let base64_data: String = captures[2]
            .chars()
            .filter(|ch| !ch.is_ascii_whitespace())
            .collect();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(base64_data.as_bytes())
            .map_err(|_| invalid(ValidationIssue::InvalidBase64))?;
        if decoded.is_empty() {
            return Err(invalid(ValidationIssue::Missing));
        }
        if decoded.len() > max_bytes {
            return Err(invalid(ValidationIssue::TooLarge {
                size: decoded.len(),
                limit: max_bytes,
            }));
        }

        Ok(Self {
            side,
            format,
            base64_data,
            decoded_len: decoded.len(),
        })
    }

    pub fn mime_type(&self) -> String {
        self.format.mime().to_string()
    }

    pub fn decoded_len(&self) -> usize {
        self.decoded_len
    }

    pub fn to_inline_image(&self) -> InlineImage {
        InlineImage {
            mime_type: self.mime_type(),
            base64_data: self.base64_data.clone(),
        }
    }
}

/// Builds a data URL from raw image bytes, as the CLI does for files on disk.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMIT: usize = 1024;

    fn issue(result: Result<ImagePayload, AssessmentError>) -> (ImageSide, ValidationIssue) {
        match result {
            Err(AssessmentError::Validation { side, issue }) => (side, issue),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_gif_naming_the_subtype() {
        let (side, problem) = issue(ImagePayload::parse(
            "data:image/gif;base64,AAAA",
            ImageSide::Before,
            LIMIT,
        ));
        assert_eq!(side, ImageSide::Before);
        assert_eq!(problem, ValidationIssue::UnsupportedFormat("gif".to_string()));
    }

    #[test]
    fn normalizes_jpg_to_jpeg() {
        let payload = ImagePayload::parse("data:image/JPG;base64,/9j/4AAQ", ImageSide::After, LIMIT)
            .expect("jpg accepted");
        assert_eq!(payload.format, ImageFormat::Jpeg);
        assert_eq!(payload.mime_type(), "image/jpeg");
        assert_eq!(payload.to_inline_image().base64_data, "/9j/4AAQ");
    }

    #[test]
    fn accepts_png() {
        let url = encode_data_url("image/png", b"\x89PNG\r\n");
        let payload = ImagePayload::parse(&url, ImageSide::Before, LIMIT).expect("png accepted");
        assert_eq!(payload.mime_type(), "image/png");
        assert_eq!(payload.decoded_len(), 6);
    }

    #[test]
    fn rejects_plain_urls_and_empty_input() {
        let (_, problem) = issue(ImagePayload::parse(
            "https://example.org/flood.jpg",
            ImageSide::After,
            LIMIT,
        ));
        assert_eq!(problem, ValidationIssue::MalformedDataUrl);

        let (side, problem) = issue(ImagePayload::parse("  ", ImageSide::After, LIMIT));
        assert_eq!(side, ImageSide::After);
        assert_eq!(problem, ValidationIssue::Missing);
    }

    #[test]
    fn rejects_bad_base64_and_oversized_images() {
        let (_, problem) = issue(ImagePayload::parse(
            "data:image/png;base64,@@@",
            ImageSide::Before,
            LIMIT,
        ));
        assert_eq!(problem, ValidationIssue::InvalidBase64);

        let url = encode_data_url("image/png", &[0u8; 16]);
        let (_, problem) = issue(ImagePayload::parse(&url, ImageSide::Before, 8));
        assert_eq!(problem, ValidationIssue::TooLarge { size: 16, limit: 8 });
    }
}
