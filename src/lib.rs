//! # imgrid
//!
//! Helpers for looking at batches of images while training image models.
//!
//! [`save_image`] lays a batch out as a padded grid and writes it to a file or
//! stream, [`show_img`] and [`show_img_grid`] draw grayscale previews onto a
//! [`Figure`].
//!
//! ## Example
//!
//! ```no_run
//! use imgrid::{save_image, GridConfig};
//! use ndarray::Array4;
//!
//! # fn main() -> imgrid::Result<()> {
//! // 16 MNIST-sized samples with values in [0, 1]
//! let samples = Array4::<f32>::zeros((16, 28, 28, 1));
//!
//! save_image(samples, "samples.png", &GridConfig::default())?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod grid;
pub mod image;
pub mod plot;

pub use crate::error::{Error, Result};
pub use crate::grid::{make_grid, GridConfig, GridLayout};
pub use crate::image::{quantize, save_image, write_image, Destination, ImageBatch};
pub use crate::plot::{show_img, show_img_grid, Figure};
