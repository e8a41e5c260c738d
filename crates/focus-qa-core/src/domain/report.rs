//! Verdicts produced by the focus scorers.

use serde::{Deserialize, Serialize};

use super::{AdaptiveThreshold, PatchGrid};

/// Final classification of one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Combined global focus score (higher is sharper).
    pub score: f64,
    /// Whether the image is classified as blurry.
    pub is_blurry: bool,
}

impl ScoreResult {
    /// Verdict for input that could not be scored: score zero, blurry.
    pub const FAIL_SAFE: Self = Self {
        score: 0.0,
        is_blurry: true,
    };
}

/// Whole-image focus measures and their verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalScore {
    /// Multi-scale Laplacian variance.
    pub laplacian: f64,
    /// Mean squared Sobel gradient magnitude.
    pub tenengrad: f64,
    /// Mean log-magnitude after low-frequency suppression (dB).
    pub fft: f64,
    /// Weighted sum of the three measures.
    pub combined: f64,
    /// Brightness-adapted threshold the combined score was compared against.
    pub threshold: AdaptiveThreshold,
    /// `combined < threshold`.
    pub is_blurry: bool,
}

/// Per-patch focus verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatchReport {
    /// Grid actually used (after clamping to the image size).
    pub grid: PatchGrid,
    /// Whether the configured grid had to be shrunk to fit the image.
    pub clamped: bool,
    /// Cells whose Laplacian variance fell below their threshold.
    pub blurry_cells: usize,
    /// `blurry_cells / grid.cell_count()`.
    pub blurry_fraction: f64,
    /// `blurry_fraction > fraction_blurry`.
    pub is_blurry: bool,
}

/// Everything the classifier computed for one image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusReport {
    /// Global measures.
    pub global: GlobalScore,
    /// Patch measures.
    pub local: PatchReport,
    /// Width of the scored luminance grid.
    pub grid_width: usize,
    /// Height of the scored luminance grid.
    pub grid_height: usize,
}

impl FocusReport {
    /// Combines the global and local verdicts with logical OR.
    #[must_use]
    pub fn verdict(&self) -> ScoreResult {
        ScoreResult {
            score: self.global.combined,
            is_blurry: self.global.is_blurry || self.local.is_blurry,
        }
    }
}
