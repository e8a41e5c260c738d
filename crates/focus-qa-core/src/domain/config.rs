//! Classifier configuration.

use serde::{Deserialize, Serialize};

use super::FocusError;

/// Weights of the three global focus measures.
///
/// They are expected to sum to 1.0 so combined scores stay comparable across
/// configurations. Other sums are accepted; the score scale just shifts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusWeights {
    /// Weight of the multi-scale Laplacian variance.
    pub laplacian: f64,
    /// Weight of the Tenengrad gradient energy.
    pub tenengrad: f64,
    /// Weight of the high-frequency FFT energy.
    pub fft: f64,
}

impl FocusWeights {
    /// Sum of all three weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.laplacian + self.tenengrad + self.fft
    }

    /// Whether the weights sum to 1.0 within floating tolerance.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-9
    }
}

impl Default for FocusWeights {
    fn default() -> Self {
        Self {
            laplacian: 0.35,
            tenengrad: 0.30,
            fft: 0.35,
        }
    }
}

/// Row/column partition used by the patch scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchGrid {
    /// Number of cell rows.
    pub rows: usize,
    /// Number of cell columns.
    pub cols: usize,
}

impl PatchGrid {
    /// Creates a grid of `rows x cols` cells.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl Default for PatchGrid {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

/// Tunable parameters of the focus classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Base threshold for the combined global score.
    pub global_threshold: f64,
    /// Base threshold for a single patch's Laplacian variance.
    pub local_threshold: f64,
    /// Fraction of blurry patches above which the image is locally blurry.
    pub fraction_blurry: f64,
    /// Patch partition.
    pub patch_grid: PatchGrid,
    /// Weights of the global measures.
    pub weights: FocusWeights,
    /// Side of the suppressed low-frequency square, as a fraction of the
    /// smaller image dimension.
    pub fft_high_pass_fraction: f64,
    /// Number of scales for the multi-scale Laplacian.
    pub laplacian_levels: usize,
    /// Images wider than this are downsized before scoring.
    pub max_width: usize,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            global_threshold: 120.0,
            local_threshold: 100.0,
            fraction_blurry: 0.4,
            patch_grid: PatchGrid::default(),
            weights: FocusWeights::default(),
            fft_high_pass_fraction: 0.1,
            laplacian_levels: 3,
            max_width: 1024,
        }
    }
}

impl FocusConfig {
    /// Checks that every parameter is in its documented range.
    ///
    /// Weight normalization is not enforced here.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), FocusError> {
        let invalid = |msg: String| Err(FocusError::InvalidConfig(msg));

        if !self.global_threshold.is_finite() {
            return invalid(format!(
                "global_threshold must be finite, got {}",
                self.global_threshold
            ));
        }
        if !self.local_threshold.is_finite() {
            return invalid(format!(
                "local_threshold must be finite, got {}",
                self.local_threshold
            ));
        }
        if !(self.fraction_blurry > 0.0 && self.fraction_blurry <= 1.0) {
            return invalid(format!(
                "fraction_blurry must be in (0, 1], got {}",
                self.fraction_blurry
            ));
        }
        if self.patch_grid.rows == 0 || self.patch_grid.cols == 0 {
            return invalid(format!(
                "patch_grid must have at least one row and column, got {}x{}",
                self.patch_grid.rows, self.patch_grid.cols
            ));
        }
        let w = self.weights;
        if [w.laplacian, w.tenengrad, w.fft]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return invalid(format!(
                "weights must be finite and non-negative, got ({}, {}, {})",
                w.laplacian, w.tenengrad, w.fft
            ));
        }
        if !(self.fft_high_pass_fraction > 0.0 && self.fft_high_pass_fraction < 1.0) {
            return invalid(format!(
                "fft_high_pass_fraction must be in (0, 1), got {}",
                self.fft_high_pass_fraction
            ));
        }
        if self.laplacian_levels == 0 {
            return invalid("laplacian_levels must be at least 1".to_string());
        }
        if self.max_width == 0 {
            return invalid("max_width must be at least 1".to_string());
        }
        Ok(())
    }
}
