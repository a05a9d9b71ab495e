//! Quick grayscale previews of images on a raster figure.

pub mod colormap;
mod figure;
mod show;

pub use figure::{Axes, AxesId, Figure};
pub use show::{show_img, show_img_grid};
