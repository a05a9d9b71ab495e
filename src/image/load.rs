//! Image loading utilities.

use std::path::Path;

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array3;

use crate::error::{Error, Result};

use super::{ImageTensor, RGB_CHANNELS};

/// Load an image from disk and convert to a normalized tensor.
///
/// The image is:
/// 1. Loaded from the specified path
/// 2. Resized to `size` (width, height) if given
/// 3. Converted to RGB if necessary
/// 4. Normalized to [0, 1] range
/// 5. Returned as HWC tensor (height, width, 3)
///
/// # Errors
///
/// Returns an error if the image cannot be loaded.
pub fn load_image<P: AsRef<Path>>(path: P, size: Option<(u32, u32)>) -> Result<ImageTensor> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        "Loaded {} ({}x{}, {:?})",
        path.display(),
        img.width(),
        img.height(),
        img.color()
    );

    Ok(image_to_tensor(&img, size))
}

/// Load several images, all resized to `size` if given.
///
/// # Errors
///
/// Returns the first load error encountered.
pub fn load_images<P: AsRef<Path>>(paths: &[P], size: Option<(u32, u32)>) -> Result<Vec<ImageTensor>> {
    paths.iter().map(|path| load_image(path, size)).collect()
}

/// Convert a `DynamicImage` to a normalized HWC tensor.
fn image_to_tensor(img: &DynamicImage, size: Option<(u32, u32)>) -> ImageTensor {
    let rgb = match size {
        Some((width, height)) if (width, height) != (img.width(), img.height()) => img
            .resize_exact(width, height, FilterType::Lanczos3)
            .to_rgb8(),
        _ => img.to_rgb8(),
    };

    let (width, height) = (rgb.width() as usize, rgb.height() as usize);

    Array3::from_shape_fn((height, width, RGB_CHANNELS), |(y, x, c)| {
        // Safe: x and y are bounded by the image dimensions, which fit in u32
        #[allow(clippy::cast_possible_truncation)]
        let pixel = rgb.get_pixel(x as u32, y as u32);
        f32::from(pixel[c]) / 255.0
    })
}
