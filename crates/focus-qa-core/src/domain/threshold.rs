//! Brightness-adaptive thresholds.

use serde::{Deserialize, Serialize};

/// Mean luminance below which a region counts as dark.
pub const DARK_MEAN: f64 = 50.0;
/// Mean luminance above which a region counts as bright.
pub const BRIGHT_MEAN: f64 = 200.0;

/// A base threshold scaled by the brightness of the region it governs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveThreshold {
    /// Unscaled threshold.
    pub base: f64,
    /// Brightness factor: 0.8 (dark), 1.0 or 1.2 (bright).
    pub factor: f64,
}

impl AdaptiveThreshold {
    /// Derives the threshold for a region with the given mean luminance.
    #[must_use]
    pub fn for_mean(base: f64, mean: f64) -> Self {
        Self {
            base,
            factor: intensity_factor(mean),
        }
    }

    /// Effective threshold value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.base * self.factor
    }

    /// Strict comparison: `measure < value()`.
    #[must_use]
    pub fn is_below(&self, measure: f64) -> bool {
        measure < self.value()
    }
}

/// Scale factor for a region's mean luminance.
#[must_use]
pub fn intensity_factor(mean: f64) -> f64 {
    if mean < DARK_MEAN {
        0.8
    } else if mean > BRIGHT_MEAN {
        1.2
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_bands() {
        assert!((intensity_factor(0.0) - 0.8).abs() < f64::EPSILON);
        assert!((intensity_factor(49.9) - 0.8).abs() < f64::EPSILON);
        assert!((intensity_factor(50.0) - 1.0).abs() < f64::EPSILON);
        assert!((intensity_factor(200.0) - 1.0).abs() < f64::EPSILON);
        assert!((intensity_factor(200.1) - 1.2).abs() < f64::EPSILON);
        assert!((intensity_factor(255.0) - 1.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_threshold_value() {
        let t = AdaptiveThreshold::for_mean(120.0, 10.0);
        assert!((t.value() - 96.0).abs() < 1e-12);
        assert!(t.is_below(95.9));
        assert!(!t.is_below(96.0));
    }
}
