//! Laplacian focus measures.

use std::borrow::Cow;

use crate::domain::LuminanceGrid;

/// Applies the 4-neighbour Laplacian `[0 1 0; 1 -4 1; 0 1 0]` with
/// reflect-101 borders.
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub fn laplacian(grid: &LuminanceGrid) -> LuminanceGrid {
    LuminanceGrid::from_fn(grid.width(), grid.height(), |x, y| {
        let (xi, yi) = (x as isize, y as isize);
        grid.get_reflected(xi - 1, yi)
            + grid.get_reflected(xi + 1, yi)
            + grid.get_reflected(xi, yi - 1)
            + grid.get_reflected(xi, yi + 1)
            - 4.0 * grid.get(x, y)
    })
}

/// Variance of the Laplacian response.
#[must_use]
pub fn laplacian_variance(grid: &LuminanceGrid) -> f64 {
    laplacian(grid).variance()
}

/// Laplacian variance averaged over `levels` pyramid scales.
///
/// Each level measures the current grid and then halves it with
/// [`LuminanceGrid::pyr_down`]. Once halving would leave a dimension below 2
/// the grid stops shrinking and the remaining levels re-measure it; the sum
/// is always divided by `levels`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn multi_scale_laplacian_variance(grid: &LuminanceGrid, levels: usize) -> f64 {
    if levels == 0 {
        return 0.0;
    }

    let mut current = Cow::Borrowed(grid);
    let mut sum = 0.0;
    for level in 0..levels {
        sum += laplacian_variance(&current);
        let last = level + 1 == levels;
        if !last && can_pyr_down(&current) {
            current = Cow::Owned(current.pyr_down());
        }
    }
    sum / levels as f64
}

fn can_pyr_down(grid: &LuminanceGrid) -> bool {
    grid.width().div_ceil(2) >= 2 && grid.height().div_ceil(2) >= 2
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;

    fn checkerboard(size: usize, cell: usize) -> LuminanceGrid {
        LuminanceGrid::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                255.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn test_constant_has_zero_response() {
        let grid = LuminanceGrid::from_fn(16, 9, |_, _| 77.0);
        assert!(laplacian(&grid).as_slice().iter().all(|v| v.abs() < 1e-12));
        assert!(laplacian_variance(&grid).abs() < 1e-12);
        assert!(multi_scale_laplacian_variance(&grid, 3).abs() < 1e-12);
    }

    #[test]
    fn test_linear_ramp_has_zero_interior_response() {
        let grid = LuminanceGrid::from_fn(10, 10, |x, _| 3.0 * x as f64);
        let lap = laplacian(&grid);
        for x in 1..9 {
            assert!(lap.get(x, 5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_step_edge_response() {
        let grid = LuminanceGrid::from_fn(6, 3, |x, _| if x < 3 { 255.0 } else { 0.0 });
        let lap = laplacian(&grid);
        assert!((lap.get(2, 1) + 255.0).abs() < 1e-12);
        assert!((lap.get(3, 1) - 255.0).abs() < 1e-12);
        assert!(lap.get(0, 1).abs() < 1e-12);
    }

    #[test]
    fn test_single_pixel_grid() {
        let grid = LuminanceGrid::from_fn(1, 1, |_, _| 200.0);
        assert!(laplacian_variance(&grid).abs() < 1e-12);
        assert!(multi_scale_laplacian_variance(&grid, 3).abs() < 1e-12);
    }

    #[test]
    fn test_sharp_pattern_scores_higher_than_smooth() {
        let sharp = checkerboard(64, 8);
        let smooth = LuminanceGrid::from_fn(64, 64, |x, _| 127.5 + 127.5 * (x as f64 / 8.0).sin());
        assert!(laplacian_variance(&sharp) > 100.0 * laplacian_variance(&smooth));
    }

    #[test]
    fn test_multi_scale_single_level_matches_plain() {
        let grid = checkerboard(32, 4);
        let plain = laplacian_variance(&grid);
        let multi = multi_scale_laplacian_variance(&grid, 1);
        assert!((plain - multi).abs() < 1e-9);
    }

    #[test]
    fn test_multi_scale_stops_shrinking_on_tiny_grids() {
        // 3x3 -> 2x2, then 2x2 cannot shrink further: levels 2 and 3 reuse it.
        let grid = LuminanceGrid::from_fn(3, 3, |x, y| ((x + y) % 2) as f64 * 100.0);
        let level0 = laplacian_variance(&grid);
        let level1 = laplacian_variance(&grid.pyr_down());
        let expected = (level0 + 2.0 * level1) / 3.0;
        let got = multi_scale_laplacian_variance(&grid, 3);
        assert!((got - expected).abs() < 1e-9, "{got} != {expected}");
    }

    #[test]
    fn test_zero_levels() {
        let grid = checkerboard(8, 2);
        assert!(multi_scale_laplacian_variance(&grid, 0).abs() < f64::EPSILON);
    }
}
