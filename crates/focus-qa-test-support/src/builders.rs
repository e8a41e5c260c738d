//! Synthetic images with known focus behavior.

use std::io::Cursor;

use focus_qa_core::domain::ImageInfo;
use image::{DynamicImage, GrayImage, ImageFormat, Luma, RgbImage};

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);
const MID_GRAY: Luma<u8> = Luma([128]);

/// Generators for test images whose sharp/blurry verdict is predictable.
///
/// Every image is tagged with a `synthetic://` path naming its pattern.
pub struct SyntheticImageBuilder;

fn gray(name: &str, img: GrayImage) -> ImageInfo {
    ImageInfo::new(format!("synthetic://{name}"), DynamicImage::ImageLuma8(img))
}

fn is_even_cell(x: u32, y: u32, cell: u32) -> bool {
    (x / cell + y / cell) % 2 == 0
}

impl SyntheticImageBuilder {
    // Sharp

    /// Black/white checkerboard with 8-pixel cells.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> ImageInfo {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Black/white checkerboard; a `cell_size` of 0 is treated as 1.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let cell = cell_size.max(1);
        let img = GrayImage::from_fn(width, height, |x, y| {
            if is_even_cell(x, y, cell) {
                WHITE
            } else {
                BLACK
            }
        });
        gray("checkerboard", img)
    }

    /// Red/blue checkerboard; only the luma differs between cells.
    #[must_use]
    pub fn color_checkerboard(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let cell = cell_size.max(1);
        let img = RgbImage::from_fn(width, height, |x, y| {
            if is_even_cell(x, y, cell) {
                image::Rgb([230u8, 20, 20])
            } else {
                image::Rgb([20u8, 20, 230])
            }
        });
        ImageInfo::new(
            "synthetic://color_checkerboard",
            DynamicImage::ImageRgb8(img),
        )
    }

    /// Fine 4-pixel checkerboard in the top quarter, flat mid-gray below.
    ///
    /// Globally it has plenty of edges, but most patches carry none.
    #[must_use]
    pub fn top_textured(width: u32, height: u32) -> ImageInfo {
        let textured_rows = height / 4;
        let img = GrayImage::from_fn(width, height, |x, y| {
            match (y < textured_rows, is_even_cell(x, y, 4)) {
                (false, _) => MID_GRAY,
                (true, true) => WHITE,
                (true, false) => BLACK,
            }
        });
        gray("top_textured", img)
    }

    // Blurry

    /// Flat field of a single gray level.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> ImageInfo {
        gray(
            "uniform_gray",
            GrayImage::from_pixel(width, height, Luma([value])),
        )
    }

    /// Left-to-right ramp, 0 at the first column rising towards 255.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> ImageInfo {
        let span = width.max(1);
        let img = GrayImage::from_fn(width, height, |x, _| Luma([(255 * x / span) as u8]));
        gray("horizontal_gradient", img)
    }

    /// Applies a Gaussian blur with standard deviation `sigma`.
    #[must_use]
    pub fn gaussian_blurred(info: &ImageInfo, sigma: f32) -> ImageInfo {
        Self::transform(info, "gaussian", |img| {
            DynamicImage::ImageLuma8(image::imageops::blur(&img.to_luma8(), sigma))
        })
    }

    /// Applies a `(2 * radius + 1)`-wide box blur with clamped borders.
    #[must_use]
    pub fn box_blurred(info: &ImageInfo, radius: u32) -> ImageInfo {
        Self::transform(info, "box", |img| {
            DynamicImage::ImageLuma8(box_blur(&img.to_luma8(), radius))
        })
    }

    // Unscorable

    /// An image whose bytes could not be decoded.
    #[must_use]
    pub fn undecodable(path: &str) -> ImageInfo {
        ImageInfo::undecodable(path, "synthetic decode failure")
    }

    /// Bytes that no image decoder accepts.
    #[must_use]
    pub fn corrupt_bytes() -> Vec<u8> {
        b"\x89PNG\r\n\x1a\nthis is not really a png".to_vec()
    }

    // Edge cases

    /// A single pixel.
    #[must_use]
    pub fn single_pixel(value: u8) -> ImageInfo {
        gray("1x1", GrayImage::from_pixel(1, 1, Luma([value])))
    }

    /// Encodes the image as PNG bytes.
    ///
    /// # Panics
    ///
    /// Panics if `info` holds no decoded pixels or encoding fails.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn png_bytes(info: &ImageInfo) -> Vec<u8> {
        let img = info.pixels.as_ref().expect("image has pixels");
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("PNG encoding succeeds");
        bytes
    }

    /// Writes the image as a PNG file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[allow(clippy::expect_used)]
    pub fn save_png(info: &ImageInfo, path: &std::path::Path) {
        std::fs::write(path, Self::png_bytes(info)).expect("write PNG fixture");
    }

    #[allow(clippy::expect_used)]
    fn transform(
        info: &ImageInfo,
        suffix: &str,
        f: impl FnOnce(&DynamicImage) -> DynamicImage,
    ) -> ImageInfo {
        let img = info.pixels.as_ref().expect("image has pixels");
        ImageInfo::new(format!("{}+{suffix}", info.path), f(img))
    }
}

/// Reference images at a fixed 128x128 size.
impl SyntheticImageBuilder {
    /// 8-pixel checkerboard.
    #[must_use]
    pub fn sharp_image() -> ImageInfo {
        Self::checkerboard(128, 128)
    }

    /// Mid-gray flat field.
    #[must_use]
    pub fn blurry_image() -> ImageInfo {
        Self::uniform_gray(128, 128, 128)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
fn box_blur(src: &GrayImage, radius: u32) -> GrayImage {
    let (w, h) = src.dimensions();
    if radius == 0 || w == 0 || h == 0 {
        return src.clone();
    }
    let r = radius as i64;
    let taps = (2 * r + 1) as u32;
    let clamp = |v: i64, len: u32| v.clamp(0, i64::from(len) - 1) as u32;

    let horizontal = GrayImage::from_fn(w, h, |x, y| {
        let sum: u32 = (-r..=r)
            .map(|d| u32::from(src.get_pixel(clamp(i64::from(x) + d, w), y).0[0]))
            .sum();
        Luma([((sum + taps / 2) / taps) as u8])
    });
    GrayImage::from_fn(w, h, |x, y| {
        let sum: u32 = (-r..=r)
            .map(|d| u32::from(horizontal.get_pixel(x, clamp(i64::from(y) + d, h)).0[0]))
            .sum();
        Luma([((sum + taps / 2) / taps) as u8])
    })
}
