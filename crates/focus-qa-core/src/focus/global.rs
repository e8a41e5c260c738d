//! Whole-image focus score.

use crate::domain::{AdaptiveThreshold, FocusConfig, GlobalScore, LuminanceGrid};

use super::fft::high_frequency_energy;
use super::laplacian::multi_scale_laplacian_variance;
use super::tenengrad::tenengrad;

/// Scores the whole grid and compares the weighted sum of the three focus
/// measures against a brightness-adapted threshold.
#[must_use]
pub fn score_global(grid: &LuminanceGrid, config: &FocusConfig) -> GlobalScore {
    let laplacian = multi_scale_laplacian_variance(grid, config.laplacian_levels);
    let tenengrad = tenengrad(grid);
    let fft = high_frequency_energy(grid, config.fft_high_pass_fraction);

    let w = &config.weights;
    let combined = w.laplacian * laplacian + w.tenengrad * tenengrad + w.fft * fft;

    let threshold = AdaptiveThreshold::for_mean(config.global_threshold, grid.mean());

    GlobalScore {
        laplacian,
        tenengrad,
        fft,
        combined,
        threshold,
        is_blurry: threshold.is_below(combined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FocusWeights;

    fn checkerboard(size: usize, cell: usize, low: f64, high: f64) -> LuminanceGrid {
        LuminanceGrid::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                high
            } else {
                low
            }
        })
    }

    #[test]
    fn test_uniform_is_globally_blurry() {
        let grid = LuminanceGrid::from_fn(64, 64, |_, _| 128.0);
        let score = score_global(&grid, &FocusConfig::default());
        assert!(score.laplacian.abs() < 1e-12);
        assert!(score.tenengrad.abs() < 1e-12);
        assert!(score.is_blurry);
        assert!(score.combined < 120.0);
    }

    #[test]
    fn test_checkerboard_is_globally_sharp() {
        let grid = checkerboard(128, 8, 0.0, 255.0);
        let score = score_global(&grid, &FocusConfig::default());
        assert!(!score.is_blurry, "combined = {}", score.combined);
        assert!((score.threshold.factor - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combined_is_weighted_sum() {
        let grid = checkerboard(32, 4, 20.0, 80.0);
        let config = FocusConfig::default();
        let score = score_global(&grid, &config);
        let expected = 0.35 * score.laplacian + 0.30 * score.tenengrad + 0.35 * score.fft;
        assert!((score.combined - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unnormalized_weights_still_score() {
        let grid = checkerboard(32, 4, 0.0, 255.0);
        let config = FocusConfig {
            weights: FocusWeights {
                laplacian: 2.0,
                tenengrad: 0.0,
                fft: 0.0,
            },
            ..Default::default()
        };
        let score = score_global(&grid, &config);
        assert!((score.combined - 2.0 * score.laplacian).abs() < 1e-9);
    }

    #[test]
    fn test_dark_image_uses_lower_threshold() {
        let grid = checkerboard(32, 4, 0.0, 40.0);
        let score = score_global(&grid, &FocusConfig::default());
        assert!((score.threshold.factor - 0.8).abs() < f64::EPSILON);
        assert!((score.threshold.value() - 96.0).abs() < 1e-9);
    }

    #[test]
    fn test_bright_image_uses_higher_threshold() {
        let grid = LuminanceGrid::from_fn(32, 32, |_, _| 230.0);
        let score = score_global(&grid, &FocusConfig::default());
        assert!((score.threshold.factor - 1.2).abs() < f64::EPSILON);
    }
}
