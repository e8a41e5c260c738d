//! Single-channel luminance grid shared by every focus measure.

/// Axis-aligned rectangle in grid coordinates (half-open on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    /// Left column (inclusive).
    pub x: usize,
    /// Top row (inclusive).
    pub y: usize,
    /// Width in samples.
    pub width: usize,
    /// Height in samples.
    pub height: usize,
}

impl Rect {
    /// Number of samples covered by the rectangle.
    #[must_use]
    pub const fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Row-major grid of real-valued luminance samples.
///
/// Built once per image by the preprocessor and only read afterwards, so it
/// can be shared between scorers running on different threads.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceGrid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl LuminanceGrid {
    /// Wraps row-major samples.
    ///
    /// Returns `None` if either dimension is zero or `data` has the wrong length.
    #[must_use]
    pub fn new(width: usize, height: usize, data: Vec<f64>) -> Option<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a grid by evaluating `f(x, y)` for every sample.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        assert!(width > 0 && height > 0, "grid dimensions must be non-zero");
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Grid width (columns).
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Grid height (rows).
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major samples.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Sample at column `x`, row `y`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    /// Sample at signed coordinates, mirrored back into range (reflect-101).
    #[inline]
    #[must_use]
    pub fn get_reflected(&self, x: isize, y: isize) -> f64 {
        self.get(reflect_101(x, self.width), reflect_101(y, self.height))
    }

    /// Mean of all samples.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Population variance of all samples.
    #[must_use]
    pub fn variance(&self) -> f64 {
        variance(&self.data)
    }

    /// Copies the samples covered by `rect` into a new grid.
    ///
    /// Returns `None` if the rectangle is empty or leaves the grid.
    #[must_use]
    pub fn crop(&self, rect: Rect) -> Option<Self> {
        if rect.area() == 0
            || rect.x + rect.width > self.width
            || rect.y + rect.height > self.height
        {
            return None;
        }
        let mut data = Vec::with_capacity(rect.area());
        for row in rect.y..rect.y + rect.height {
            let start = row * self.width + rect.x;
            data.extend_from_slice(&self.data[start..start + rect.width]);
        }
        Some(Self {
            width: rect.width,
            height: rect.height,
            data,
        })
    }

    /// Applies a function to every sample, keeping the geometry.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Gaussian-smoothed 2x decimation.
    ///
    /// Smooths with the separable 5-tap kernel `[1 4 6 4 1] / 16` (reflect-101
    /// borders) and keeps every even row and column, giving
    /// `((w + 1) / 2, (h + 1) / 2)`.
    #[allow(clippy::cast_possible_wrap)]
    #[must_use]
    pub fn pyr_down(&self) -> Self {
        const TAPS: [f64; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];

        let out_w = self.width.div_ceil(2);
        let out_h = self.height.div_ceil(2);

        // Horizontal pass evaluated only at even columns.
        let mut horizontal = Vec::with_capacity(out_w * self.height);
        for y in 0..self.height {
            for ox in 0..out_w {
                let cx = (ox * 2) as isize;
                let sum: f64 = TAPS
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| {
                        let x = reflect_101(cx + k as isize - 2, self.width);
                        w * self.data[y * self.width + x]
                    })
                    .sum();
                horizontal.push(sum / 16.0);
            }
        }

        let mut data = Vec::with_capacity(out_w * out_h);
        for oy in 0..out_h {
            let cy = (oy * 2) as isize;
            for ox in 0..out_w {
                let sum: f64 = TAPS
                    .iter()
                    .enumerate()
                    .map(|(k, &w)| {
                        let y = reflect_101(cy + k as isize - 2, self.height);
                        w * horizontal[y * out_w + ox]
                    })
                    .sum();
                data.push(sum / 16.0);
            }
        }

        Self {
            width: out_w,
            height: out_h,
            data,
        }
    }
}

/// Mirrors an out-of-range index back into `0..len` without repeating the
/// edge sample (`gfedcb|abcdefgh|gfedcba`).
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
#[must_use]
pub fn reflect_101(index: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let len = len as isize;
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    i as usize
}

/// Population variance of a slice; zero for empty input.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n
}
