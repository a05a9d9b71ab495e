//! Grayscale colour mapping of 2-D slices.

use image::{GrayImage, Luma};
use ndarray::ArrayView2;

/// Map a 2-D slice to gray levels, stretching its finite min..max to black..white.
///
/// A constant slice maps to black. Non-finite values map to white, the
/// figure background.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gray(slice: ArrayView2<'_, f32>) -> GrayImage {
    let (min, max) = slice
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    let (height, width) = slice.dim();
    // Safe: dimensions come from an image that already fits in u32
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        let value = slice[[y as usize, x as usize]];
        let level = if !value.is_finite() {
            u8::MAX
        } else if range > 0.0 {
            ((value - min) / range * 255.0).round().clamp(0.0, 255.0) as u8
        } else {
            0
        };
        Luma([level])
    })
}
