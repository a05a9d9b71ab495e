//! Showing images on figure axes.

use ndarray::Axis;

use crate::error::{Error, Result};
use crate::image::ImageTensor;

use super::{colormap, AxesId, Figure};

/// Shows a single image.
///
/// Channel 0 of `image` is drawn in grayscale on `axes`, or on the current
/// axes of `figure` when `axes` is `None`. Tick marks are removed and the
/// title is set when it is non-empty.
///
/// # Errors
///
/// Returns an error if `image` has no channels or `axes` is not part of `figure`.
pub fn show_img(
    figure: &mut Figure,
    image: &ImageTensor,
    axes: Option<AxesId>,
    title: Option<&str>,
) -> Result<()> {
    if image.len_of(Axis(2)) == 0 {
        return Err(Error::InvalidParameter {
            name: "image".to_string(),
            reason: "image has no channels".to_string(),
        });
    }

    let id = match axes {
        Some(id) => id,
        None => figure.gca(),
    };
    let axes = figure.get_mut(id)?;

    axes.set_image(colormap::gray(image.index_axis(Axis(2), 0)));
    axes.clear_ticks();
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        axes.set_title(title);
    }

    Ok(())
}

/// Shows a grid of images.
///
/// The figure has `n x n` axes with `n = ceil(sqrt(images.len()))`. Images
/// and titles are paired up in order; axes past the last pair stay empty.
///
/// # Errors
///
/// Returns an error if `images` is empty or any image has no channels.
pub fn show_img_grid<S: AsRef<str>>(images: &[ImageTensor], titles: &[S]) -> Result<Figure> {
    if images.is_empty() {
        return Err(Error::InvalidParameter {
            name: "images".to_string(),
            reason: "need at least one image to show".to_string(),
        });
    }

    let mut n = 1;
    while n * n < images.len() {
        n += 1;
    }
    tracing::debug!("Showing {} images on a {n}x{n} grid", images.len());

    let mut figure = Figure::subplots(n, n, Figure::DEFAULT_CELL);
    for (i, (image, title)) in images.iter().zip(titles).enumerate() {
        let axes = figure.subplot(i / n, i % n);
        show_img(&mut figure, image, axes, Some(title.as_ref()))?;
    }

    Ok(figure)
}
