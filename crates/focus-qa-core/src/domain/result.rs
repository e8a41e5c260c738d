//! Analysis result types.

use serde::{Deserialize, Serialize};

use super::{FocusError, FocusReport, ScoreResult};

/// Complete analysis result for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Path the image was read from.
    pub path: String,
    /// Name the image was supplied under.
    pub original_name: String,
    /// Timestamp of analysis (ISO 8601).
    pub timestamp: String,
    /// Image dimensions, absent when the image could not be decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<ImageDimensions>,
    /// Combined focus score (0 for the fail-safe verdict).
    pub blur_score: f64,
    /// Whether the image was classified as blurry.
    pub is_blurry: bool,
    /// Why the fail-safe verdict was used, if it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
    /// Per-measure breakdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FocusReport>,
}

impl AnalysisResult {
    /// Score and verdict as a [`ScoreResult`].
    #[must_use]
    pub const fn score(&self) -> ScoreResult {
        ScoreResult {
            score: self.blur_score,
            is_blurry: self.is_blurry,
        }
    }
}

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    /// Creates a dimensions record.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An image handed to the classifier by a source adapter.
///
/// Decoding happens at the adapter; a failed decode is carried through so the
/// caller can still report a verdict for it.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path to the image file.
    pub path: String,
    /// Name the image was supplied under (file name for local files).
    pub original_name: String,
    /// Decoded image data, or why decoding failed.
    pub pixels: Result<image::DynamicImage, FocusError>,
}

impl ImageInfo {
    /// Wraps a decoded image; the original name is the last path component.
    #[must_use]
    pub fn new(path: impl Into<String>, image: image::DynamicImage) -> Self {
        let path = path.into();
        Self {
            original_name: file_name(&path),
            path,
            pixels: Ok(image),
        }
    }

    /// Records an image whose bytes could not be decoded.
    #[must_use]
    pub fn undecodable(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            original_name: file_name(&path),
            path,
            pixels: Err(FocusError::Decode(reason.into())),
        }
    }

    /// Overrides the name the image was supplied under.
    #[must_use]
    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = name.into();
        self
    }

    /// Pixel dimensions of the decoded image.
    #[must_use]
    pub fn dimensions(&self) -> Option<ImageDimensions> {
        self.pixels
            .as_ref()
            .ok()
            .map(|img| ImageDimensions::new(img.width(), img.height()))
    }
}

fn file_name(path: &str) -> String {
    std::path::Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_image_info_names() {
        let img = image::DynamicImage::new_luma8(4, 3);
        let info = ImageInfo::new("/tmp/photos/cat.png", img);
        assert_eq!(info.original_name, "cat.png");
        assert_eq!(info.dimensions(), Some(ImageDimensions::new(4, 3)));

        let renamed = info.with_original_name("holiday.png");
        assert_eq!(renamed.original_name, "holiday.png");
        assert_eq!(renamed.path, "/tmp/photos/cat.png");
    }

    #[test]
    fn test_undecodable_has_no_dimensions() {
        let info = ImageInfo::undecodable("broken.jpg", "truncated");
        assert!(info.dimensions().is_none());
        assert!(matches!(info.pixels, Err(FocusError::Decode(_))));
    }

    #[test]
    fn test_result_serialization_skips_empty_fields() {
        let result = AnalysisResult {
            path: "a.png".to_string(),
            original_name: "a.png".to_string(),
            timestamp: "2024-01-01T00:00:00Z".to_string(),
            dimensions: None,
            blur_score: 0.0,
            is_blurry: true,
            failure: None,
            details: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("dimensions").is_none());
        assert!(json.get("failure").is_none());
        assert!(json.get("details").is_none());
        assert_eq!(json["is_blurry"], serde_json::Value::Bool(true));
    }
}
