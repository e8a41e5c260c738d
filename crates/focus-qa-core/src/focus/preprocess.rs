//! Image normalization: luminance conversion and width-bounded resizing.

use image::DynamicImage;
use tracing::debug;

use crate::domain::{FocusError, LuminanceGrid};

/// BT.601 luma weights (R, G, B).
const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Converts a decoded image into the luminance grid all scorers read.
///
/// Images wider than `max_width` are area-averaged down to exactly
/// `max_width` columns, keeping the aspect ratio.
///
/// # Errors
///
/// Returns [`FocusError::Decode`] if the image has no pixels.
pub fn normalize(image: &DynamicImage, max_width: usize) -> Result<LuminanceGrid, FocusError> {
    let luma = to_luminance(image)?;

    let Some((width, height)) = target_size(luma.width(), luma.height(), max_width) else {
        return Ok(luma);
    };

    debug!(
        "Resizing {}x{} to {}x{}",
        luma.width(),
        luma.height(),
        width,
        height
    );
    Ok(resize_area(&luma, width, height))
}

/// Size an image of `width x height` is resized to, or `None` if it already fits.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn target_size(width: usize, height: usize, max_width: usize) -> Option<(usize, usize)> {
    if width <= max_width {
        return None;
    }
    let new_height = (max_width as f64 * height as f64 / width as f64).round() as usize;
    Some((max_width, new_height.max(1)))
}

/// Single-channel luminance of an image, rounded to whole 8-bit levels.
///
/// # Errors
///
/// Returns [`FocusError::Decode`] if the image has no pixels.
pub fn to_luminance(image: &DynamicImage) -> Result<LuminanceGrid, FocusError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let data = rgb
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (LUMA_WEIGHTS[0] * f64::from(r)
                + LUMA_WEIGHTS[1] * f64::from(g)
                + LUMA_WEIGHTS[2] * f64::from(b))
            .round()
        })
        .collect();

    LuminanceGrid::new(width as usize, height as usize, data)
        .ok_or_else(|| FocusError::Decode(format!("image has no pixels ({width}x{height})")))
}

/// Downsamples by exact area averaging: every output sample is the mean of
/// the input area it covers, with fractional coverage at cell borders.
///
/// Intended for shrinking; each target dimension must be non-zero and not
/// larger than the source.
#[must_use]
pub fn resize_area(grid: &LuminanceGrid, width: usize, height: usize) -> LuminanceGrid {
    let x_weights = area_weights(grid.width(), width);
    let y_weights = area_weights(grid.height(), height);

    let mut horizontal = Vec::with_capacity(width * grid.height());
    for y in 0..grid.height() {
        for taps in &x_weights {
            horizontal.push(taps.iter().map(|&(x, w)| w * grid.get(x, y)).sum::<f64>());
        }
    }

    LuminanceGrid::from_fn(width, height, |x, y| {
        y_weights[y]
            .iter()
            .map(|&(sy, w)| w * horizontal[sy * width + x])
            .sum()
    })
}

/// For each of `dst` output cells, the source indices it overlaps and their
/// normalized overlap weights.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn area_weights(src: usize, dst: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src as f64 / dst as f64;
    (0..dst)
        .map(|i| {
            let start = i as f64 * scale;
            let end = ((i + 1) as f64 * scale).min(src as f64);
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src);
            (first..last)
                .filter_map(|j| {
                    let overlap = end.min((j + 1) as f64) - start.max(j as f64);
                    (overlap > 1e-12).then_some((j, overlap / scale))
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn test_narrow_image_not_resized() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(640, 480, |x, _| {
            Luma([(x % 256) as u8])
        }));
        let grid = normalize(&img, 1024).unwrap();
        assert_eq!(grid.width(), 640);
        assert_eq!(grid.height(), 480);
        assert_eq!(grid.get(300, 10), 44.0);
    }

    #[test]
    fn test_exact_max_width_not_resized() {
        assert!(target_size(1024, 10, 1024).is_none());
    }

    #[test]
    fn test_wide_image_keeps_aspect_ratio() {
        let img = DynamicImage::new_luma8(2048, 1000);
        let grid = normalize(&img, 1024).unwrap();
        assert_eq!(grid.width(), 1024);
        assert_eq!(grid.height(), 500);

        let (w, h) = target_size(3000, 2001, 1024).unwrap();
        assert_eq!(w, 1024);
        // 1024 * 2001 / 3000 = 683.0 -> 683
        assert_eq!(h, 683);
        let ratio_in = 2001.0 / 3000.0;
        let ratio_out = h as f64 / w as f64;
        assert!((ratio_in - ratio_out).abs() < 1.0 / w as f64);
    }

    #[test]
    fn test_target_height_never_zero() {
        assert_eq!(target_size(5000, 1, 1024), Some((1024, 1)));
    }

    #[test]
    fn test_gray_luma_is_identity() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(3, 1, |x, _| {
            Luma([[0u8, 128, 255][x as usize]])
        }));
        let grid = to_luminance(&img).unwrap();
        assert_eq!(grid.as_slice(), &[0.0, 128.0, 255.0]);
    }

    #[test]
    fn test_rgb_luma_weights() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        }));
        let grid = to_luminance(&img).unwrap();
        // 0.299 * 255 = 76.2, 0.587 * 255 = 149.7, 0.114 * 255 = 29.1
        assert_eq!(grid.as_slice(), &[76.0, 150.0, 29.0]);
    }

    #[test]
    fn test_empty_image_is_decode_failure() {
        let img = DynamicImage::new_luma8(0, 0);
        assert!(matches!(to_luminance(&img), Err(FocusError::Decode(_))));
    }

    #[test]
    fn test_area_resize_averages_blocks() {
        // 4x2 -> 2x1: each output covers a 2x2 block.
        let grid = LuminanceGrid::new(4, 2, vec![0.0, 10.0, 20.0, 30.0, 2.0, 12.0, 22.0, 32.0])
            .unwrap();
        let out = resize_area(&grid, 2, 1);
        assert!((out.get(0, 0) - 6.0).abs() < 1e-9);
        assert!((out.get(1, 0) - 26.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_resize_fractional_coverage() {
        // 3 -> 2: cells cover [0, 1.5) and [1.5, 3).
        let grid = LuminanceGrid::new(3, 1, vec![0.0, 3.0, 6.0]).unwrap();
        let out = resize_area(&grid, 2, 1);
        assert!((out.get(0, 0) - 1.0).abs() < 1e-9);
        assert!((out.get(1, 0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_area_resize_preserves_mean() {
        let grid = LuminanceGrid::from_fn(300, 120, |x, y| ((x * 7 + y * 13) % 256) as f64);
        let out = resize_area(&grid, 100, 40);
        assert!((grid.mean() - out.mean()).abs() < 1e-6);
    }
}
