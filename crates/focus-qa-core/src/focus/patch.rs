//! Patch-based local focus verdict.
//!
//! A sharp subject can dominate the global measures while large parts of the
//! frame are out of focus. Each cell of a fixed grid gets its own Laplacian
//! variance and brightness-adapted threshold; the image is locally blurry
//! when too many cells fall below theirs.

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{AdaptiveThreshold, FocusConfig, LuminanceGrid, PatchGrid, PatchReport, Rect};

use super::laplacian::laplacian_variance;

/// Clamps a patch grid so that no cell is narrower or shorter than one sample.
#[must_use]
pub fn effective_grid(grid: PatchGrid, width: usize, height: usize) -> PatchGrid {
    PatchGrid::new(grid.rows.min(height).max(1), grid.cols.min(width).max(1))
}

/// Cell rectangles tiling a `width x height` grid exactly.
///
/// All cells use `height / rows` by `width / cols`; the last row and column
/// absorb the remainder.
#[must_use]
pub fn cells(grid: PatchGrid, width: usize, height: usize) -> Vec<Rect> {
    let cell_h = height / grid.rows;
    let cell_w = width / grid.cols;

    let mut rects = Vec::with_capacity(grid.cell_count());
    for r in 0..grid.rows {
        let y = r * cell_h;
        let last_row = r + 1 == grid.rows;
        let y_end = if last_row { height } else { y + cell_h };
        for c in 0..grid.cols {
            let x = c * cell_w;
            let last_col = c + 1 == grid.cols;
            let x_end = if last_col { width } else { x + cell_w };
            rects.push(Rect {
                x,
                y,
                width: x_end - x,
                height: y_end - y,
            });
        }
    }
    rects
}

/// Whether one cell's Laplacian variance is below its adaptive threshold.
#[must_use]
pub fn is_cell_blurry(cell: &LuminanceGrid, local_threshold: f64) -> bool {
    let threshold = AdaptiveThreshold::for_mean(local_threshold, cell.mean());
    threshold.is_below(laplacian_variance(cell))
}

/// Scores every cell and reports the fraction of blurry ones.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn score_patches(grid: &LuminanceGrid, config: &FocusConfig) -> PatchReport {
    let layout = effective_grid(config.patch_grid, grid.width(), grid.height());
    let clamped = layout != config.patch_grid;
    if clamped {
        debug!(
            "Patch grid {}x{} clamped to {}x{} for {}x{} image",
            config.patch_grid.rows,
            config.patch_grid.cols,
            layout.rows,
            layout.cols,
            grid.width(),
            grid.height()
        );
    }

    let blurry_cells = cells(layout, grid.width(), grid.height())
        .into_par_iter()
        .filter_map(|rect| grid.crop(rect))
        .filter(|cell| is_cell_blurry(cell, config.local_threshold))
        .count();

    let blurry_fraction = blurry_cells as f64 / layout.cell_count() as f64;

    PatchReport {
        grid: layout,
        clamped,
        blurry_cells,
        blurry_fraction,
        is_blurry: blurry_fraction > config.fraction_blurry,
    }
}
