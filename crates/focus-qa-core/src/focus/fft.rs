//! High-frequency energy in the Fourier domain.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::domain::LuminanceGrid;

/// Floor added to magnitudes before taking the logarithm.
pub const LOG_EPSILON: f64 = 1e-10;

/// Mean log-magnitude (dB) of the image after removing low frequencies.
///
/// Transforms the grid, zeroes a centred square of side
/// `2 * floor(min(h, w) * high_pass_fraction / 2)` around DC in the shifted
/// spectrum, transforms back and averages `20 * log10(|v| + eps)`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn high_frequency_energy(grid: &LuminanceGrid, high_pass_fraction: f64) -> f64 {
    let (w, h) = (grid.width(), grid.height());
    let mut spectrum: Vec<Complex<f64>> = grid
        .as_slice()
        .iter()
        .map(|&v| Complex::new(v, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    fft_2d(&mut planner, &mut spectrum, w, h, false);
    suppress_low_frequencies(
        &mut spectrum,
        w,
        h,
        high_pass_half_size(w, h, high_pass_fraction),
    );
    fft_2d(&mut planner, &mut spectrum, w, h, true);

    let norm = 1.0 / (w * h) as f64;
    let total: f64 = spectrum
        .iter()
        .map(|c| 20.0 * (c.norm() * norm + LOG_EPSILON).log10())
        .sum();
    total / (w * h) as f64
}

/// Half side of the suppressed square.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn high_pass_half_size(width: usize, height: usize, fraction: f64) -> usize {
    (width.min(height) as f64 * fraction / 2.0).floor() as usize
}

/// Zeroes rows and columns `[n/2 - half, n/2 + half)` of the centre-shifted
/// spectrum, addressed directly in unshifted coordinates.
fn suppress_low_frequencies(spectrum: &mut [Complex<f64>], w: usize, h: usize, half: usize) {
    if half == 0 {
        return;
    }
    let (cy, cx) = (h / 2, w / 2);
    for sy in cy - half..cy + half {
        let y = unshift(sy, h);
        for sx in cx - half..cx + half {
            spectrum[y * w + unshift(sx, w)] = Complex::new(0.0, 0.0);
        }
    }
}

/// Index in the unshifted spectrum for index `k` of the shifted one.
const fn unshift(k: usize, n: usize) -> usize {
    (k + n - n / 2) % n
}

/// In-place separable 2D transform (rows, then columns). The inverse is
/// left unnormalized.
fn fft_2d(
    planner: &mut FftPlanner<f64>,
    data: &mut [Complex<f64>],
    w: usize,
    h: usize,
    inverse: bool,
) {
    let (row_fft, col_fft) = if inverse {
        (planner.plan_fft_inverse(w), planner.plan_fft_inverse(h))
    } else {
        (planner.plan_fft_forward(w), planner.plan_fft_forward(h))
    };

    // Every row is one contiguous chunk of length w.
    row_fft.process(data);

    let mut columns = transpose(data, w, h);
    col_fft.process(&mut columns);
    data.copy_from_slice(&transpose(&columns, h, w));
}

/// Transposes a row-major `w x h` buffer into a row-major `h x w` one.
fn transpose(data: &[Complex<f64>], w: usize, h: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); w * h];
    for y in 0..h {
        for x in 0..w {
            out[x * h + y] = data[y * w + x];
        }
    }
    out
}
