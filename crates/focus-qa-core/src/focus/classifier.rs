//! Sharp/blurry classifier combining the global and patch verdicts.

use image::DynamicImage;
use tracing::{debug, warn};

use crate::domain::{FocusConfig, FocusError, FocusReport, ImageInfo, ScoreResult};

use super::global::score_global;
use super::patch::score_patches;
use super::preprocess::normalize;

/// Focus classifier.
///
/// Stateless apart from its read-only configuration, so one instance can be
/// shared by any number of threads.
#[derive(Debug, Clone, Default)]
pub struct FocusClassifier {
    config: FocusConfig,
}

impl FocusClassifier {
    /// Creates a classifier after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::InvalidConfig`] if a parameter is out of range.
    pub fn new(config: FocusConfig) -> Result<Self, FocusError> {
        config.validate()?;
        if !config.weights.is_normalized() {
            warn!(
                "Focus weights sum to {} instead of 1.0; scores are not comparable to the default scale",
                config.weights.sum()
            );
        }
        Ok(Self { config })
    }

    /// Returns the classifier configuration.
    #[must_use]
    pub const fn config(&self) -> &FocusConfig {
        &self.config
    }

    /// Runs the full pipeline on a decoded image.
    ///
    /// The global and patch scorers run concurrently on the shared grid.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Decode`] for an image without pixels and
    /// [`FocusError::NumericAnomaly`] if a measure is not finite.
    pub fn analyze(&self, image: &DynamicImage) -> Result<FocusReport, FocusError> {
        let grid = normalize(image, self.config.max_width)?;

        let (global, local) = rayon::join(
            || score_global(&grid, &self.config),
            || score_patches(&grid, &self.config),
        );

        for (name, value) in [
            ("laplacian variance", global.laplacian),
            ("tenengrad", global.tenengrad),
            ("fft energy", global.fft),
            ("combined score", global.combined),
        ] {
            if !value.is_finite() {
                return Err(FocusError::NumericAnomaly(name));
            }
        }

        debug!(
            laplacian = global.laplacian,
            tenengrad = global.tenengrad,
            fft = global.fft,
            combined = global.combined,
            blurry_cells = local.blurry_cells,
            "Scored {}x{} grid",
            grid.width(),
            grid.height()
        );

        Ok(FocusReport {
            global,
            local,
            grid_width: grid.width(),
            grid_height: grid.height(),
        })
    }

    /// Decodes encoded image bytes and analyzes them.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Decode`] if the bytes are not a supported image,
    /// otherwise as [`Self::analyze`].
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<FocusReport, FocusError> {
        let image =
            image::load_from_memory(bytes).map_err(|e| FocusError::Decode(e.to_string()))?;
        self.analyze(&image)
    }

    /// Analyzes an image handed over by a source adapter.
    ///
    /// # Errors
    ///
    /// Propagates the adapter's decode failure, otherwise as [`Self::analyze`].
    pub fn analyze_info(&self, info: &ImageInfo) -> Result<FocusReport, FocusError> {
        match &info.pixels {
            Ok(image) => self.analyze(image),
            Err(e) => Err(e.clone()),
        }
    }

    /// Classifies a decoded image, falling back to [`ScoreResult::FAIL_SAFE`].
    #[must_use]
    pub fn classify(&self, image: &DynamicImage) -> ScoreResult {
        fail_safe(self.analyze(image))
    }

    /// Classifies encoded image bytes, falling back to [`ScoreResult::FAIL_SAFE`].
    #[must_use]
    pub fn classify_bytes(&self, bytes: &[u8]) -> ScoreResult {
        fail_safe(self.analyze_bytes(bytes))
    }
}

/// Maps any scoring failure to the conservative "score 0, blurry" verdict.
#[must_use]
pub fn fail_safe(result: Result<FocusReport, FocusError>) -> ScoreResult {
    match result {
        Ok(report) => report.verdict(),
        Err(e) => {
            debug!("Using fail-safe verdict: {e}");
            ScoreResult::FAIL_SAFE
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;
    use crate::domain::{FocusWeights, PatchGrid};
    use image::{GrayImage, Luma};

    fn checkerboard(size: u32, cell: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        }))
    }

    fn uniform(size: u32, value: u8) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_pixel(size, size, Luma([value])))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = FocusConfig {
            patch_grid: PatchGrid::new(5, 0),
            ..Default::default()
        };
        assert!(matches!(
            FocusClassifier::new(config),
            Err(FocusError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_new_accepts_unnormalized_weights() {
        let config = FocusConfig {
            weights: FocusWeights {
                laplacian: 0.5,
                tenengrad: 0.5,
                fft: 0.5,
            },
            ..Default::default()
        };
        let classifier = FocusClassifier::new(config).unwrap();
        let result = classifier.classify(&checkerboard(64, 8));
        assert!(result.score.is_finite());
    }

    #[test]
    fn test_uniform_image_is_blurry() {
        let classifier = FocusClassifier::default();
        let report = classifier.analyze(&uniform(128, 128)).unwrap();
        assert!(report.global.is_blurry);
        assert!(report.local.is_blurry);
        assert!(report.verdict().is_blurry);
    }

    #[test]
    fn test_checkerboard_is_sharp() {
        let classifier = FocusClassifier::default();
        let result = classifier.classify(&checkerboard(256, 16));
        assert!(!result.is_blurry, "score = {}", result.score);
        assert!(result.score > 120.0);
    }

    #[test]
    fn test_overflowing_score_is_numeric_anomaly() {
        let config = FocusConfig {
            weights: FocusWeights {
                laplacian: 1e308,
                tenengrad: 1e308,
                fft: 0.0,
            },
            ..Default::default()
        };
        let classifier = FocusClassifier::new(config).unwrap();
        let image = checkerboard(64, 8);

        assert_eq!(
            classifier.analyze(&image).unwrap_err(),
            FocusError::NumericAnomaly("combined score")
        );
        assert_eq!(classifier.classify(&image), ScoreResult::FAIL_SAFE);
    }

    #[test]
    fn test_empty_bytes_fail_safe() {
        let classifier = FocusClassifier::default();
        assert!(matches!(
            classifier.analyze_bytes(&[]),
            Err(FocusError::Decode(_))
        ));
        assert_eq!(classifier.classify_bytes(&[]), ScoreResult::FAIL_SAFE);
    }

    #[test]
    fn test_corrupt_bytes_fail_safe() {
        let classifier = FocusClassifier::default();
        let garbage = b"\x89PNG\r\n\x1a\nthis is not really a png";
        let result = classifier.classify_bytes(garbage);
        assert_eq!(result.score, 0.0);
        assert!(result.is_blurry);
    }

    #[test]
    fn test_zero_sized_image_fail_safe() {
        let classifier = FocusClassifier::default();
        let result = classifier.classify(&DynamicImage::new_rgb8(0, 0));
        assert_eq!(result, ScoreResult::FAIL_SAFE);
    }

    #[test]
    fn test_undecodable_info_propagates() {
        let classifier = FocusClassifier::default();
        let info = ImageInfo::undecodable("x.jpg", "bad header");
        assert_eq!(
            classifier.analyze_info(&info),
            Err(FocusError::Decode("bad header".to_string()))
        );
    }

    #[test]
    fn test_deterministic() {
        let classifier = FocusClassifier::default();
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(200, 150, |x, y| {
            Luma([((x * 31 + y * 17) % 251) as u8])
        }));
        let a = classifier.classify(&img);
        let b = classifier.classify(&img);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
        assert_eq!(a.is_blurry, b.is_blurry);
    }

    #[test]
    fn test_wide_image_scored_at_max_width() {
        let classifier = FocusClassifier::new(FocusConfig {
            max_width: 64,
            ..Default::default()
        })
        .unwrap();
        let report = classifier.analyze(&checkerboard(256, 32)).unwrap();
        assert_eq!(report.grid_width, 64);
        assert_eq!(report.grid_height, 64);
    }

    #[test]
    fn test_png_bytes_roundtrip() {
        let mut bytes = Vec::new();
        checkerboard(128, 8)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        let classifier = FocusClassifier::default();
        let from_bytes = classifier.classify_bytes(&bytes);
        let direct = classifier.classify(&checkerboard(128, 8));
        assert_eq!(from_bytes, direct);
    }
}
