//! Tenengrad gradient energy.

use crate::domain::LuminanceGrid;

/// Horizontal and vertical 3x3 Sobel responses at `(x, y)` (reflect-101 borders).
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub fn sobel_at(grid: &LuminanceGrid, x: usize, y: usize) -> (f64, f64) {
    let (x, y) = (x as isize, y as isize);
    let p = |dx: isize, dy: isize| grid.get_reflected(x + dx, y + dy);

    let gx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
    let gy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
    (gx, gy)
}

/// Mean of `dx² + dy²` over every sample.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn tenengrad(grid: &LuminanceGrid) -> f64 {
    let mut sum = 0.0;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            let (gx, gy) = sobel_at(grid, x, y);
            sum += gx * gx + gy * gy;
        }
    }
    sum / (grid.width() * grid.height()) as f64
}
