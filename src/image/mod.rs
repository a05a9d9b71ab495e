//! Image batches, loading and saving utilities.

mod batch;
mod load;
mod save;

pub use batch::ImageBatch;
pub(crate) use batch::promote_grayscale;
pub use load::{load_image, load_images};
pub use save::{quantize, save_image, write_image, Destination, WriteSeek};
pub(crate) use save::write_dynamic;

use ndarray::{Array3, Array4};

/// Batch tensor in NHWC format (batch, height, width, channels).
/// Values are expected in [0, 1]; anything outside is clipped on save.
pub type BatchTensor = Array4<f32>;

/// Single image or composed grid in HWC format.
pub type ImageTensor = Array3<f32>;

/// Number of channels in RGB images.
pub const RGB_CHANNELS: usize = 3;
