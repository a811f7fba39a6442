//! Conversion of bands and composites to 8-bit images for display.

use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::{Array3, ArrayView2};

/// Render one band as grayscale, stretching its finite min..max to 0..255.
///
/// Non-finite values render black. A constant band renders black.
pub fn band_to_gray(band: ArrayView2<'_, f32>) -> GrayImage {
    let (lines, samples) = band.dim();
    let (min, max) = band
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    log::trace!("band_to_gray: {}x{} range {}..{}", samples, lines, min, max);

    GrayImage::from_fn(samples as u32, lines as u32, |x, y| {
        let v = band[[y as usize, x as usize]];
        if !v.is_finite() || range <= 0.0 {
            return Luma([0]);
        }
        Luma([(((v - min) / range) * 255.0).round() as u8])
    })
}

/// Render a `(lines, samples, 3)` composite as RGB, clipping each channel to 0.0-1.0.
pub fn composite_to_rgb(composite: &Array3<f32>) -> RgbImage {
    let (lines, samples, _) = composite.dim();
    let to_u8 = |v: f32| {
        if v.is_finite() {
            (v.clamp(0.0, 1.0) * 255.0) as u8
        } else {
            0
        }
    };

    RgbImage::from_fn(samples as u32, lines as u32, |x, y| {
        let (line, sample) = (y as usize, x as usize);
        Rgb([
            to_u8(composite[[line, sample, 0]]),
            to_u8(composite[[line, sample, 1]]),
            to_u8(composite[[line, sample, 2]]),
        ])
    })
}
