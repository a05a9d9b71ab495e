//! Accepted batch inputs and their normalisation to a single NHWC tensor.

use ndarray::{stack, Array3, Array4, ArrayD, ArrayView3, Axis, Ix3, Ix4};

use crate::error::{Error, Result};

use super::{BatchTensor, RGB_CHANNELS};

/// A batch of images as handed in by the caller.
///
/// Either one 4-D array `(batch, height, width, channels)` or a list of 3-D
/// `(height, width, channels)` images of identical shape. Ranks are checked
/// when the batch is turned into a tensor, so dynamic-rank arrays can be
/// passed straight through.
#[derive(Debug, Clone)]
pub enum ImageBatch {
    /// A whole batch in one array.
    Array(ArrayD<f32>),
    /// Individual images, stacked along a new leading axis.
    List(Vec<ArrayD<f32>>),
}

impl From<Array4<f32>> for ImageBatch {
    fn from(array: Array4<f32>) -> Self {
        Self::Array(array.into_dyn())
    }
}

impl From<Array4<f64>> for ImageBatch {
    #[allow(clippy::cast_possible_truncation)]
    fn from(array: Array4<f64>) -> Self {
        Self::Array(array.mapv(|v| v as f32).into_dyn())
    }
}

impl From<ArrayD<f32>> for ImageBatch {
    fn from(array: ArrayD<f32>) -> Self {
        Self::Array(array)
    }
}

impl From<Vec<Array3<f32>>> for ImageBatch {
    fn from(images: Vec<Array3<f32>>) -> Self {
        Self::List(images.into_iter().map(Array3::into_dyn).collect())
    }
}

impl From<Vec<ArrayD<f32>>> for ImageBatch {
    fn from(images: Vec<ArrayD<f32>>) -> Self {
        Self::List(images)
    }
}

impl ImageBatch {
    /// Validate the input and return it as one NHWC tensor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidType`] for arrays of the wrong rank,
    /// [`Error::ShapeMismatch`] when list elements differ in shape and
    /// [`Error::InvalidParameter`] for an empty batch.
    pub fn into_tensor(self) -> Result<BatchTensor> {
        let tensor = match self {
            Self::Array(array) => {
                let ndim = array.ndim();
                array
                    .into_dimensionality::<Ix4>()
                    .map_err(|_| Error::InvalidType {
                        expected: "4-D array (batch, height, width, channels)".to_string(),
                        actual: format!("{ndim}-D array"),
                    })?
            }
            Self::List(images) => stack_images(&images)?,
        };

        if tensor.len_of(Axis(0)) == 0 {
            return Err(Error::InvalidParameter {
                name: "images".to_string(),
                reason: "batch must contain at least one image".to_string(),
            });
        }

        Ok(tensor)
    }
}

/// Stack equally shaped 3-D images into one batch.
fn stack_images(images: &[ArrayD<f32>]) -> Result<BatchTensor> {
    let views = images
        .iter()
        .enumerate()
        .map(|(index, image)| {
            image
                .view()
                .into_dimensionality::<Ix3>()
                .map_err(|_| Error::InvalidType {
                    expected: "list of 3-D arrays (height, width, channels)".to_string(),
                    actual: format!("{}-D array at index {index}", image.ndim()),
                })
        })
        .collect::<Result<Vec<ArrayView3<'_, f32>>>>()?;

    let Some(first) = views.first() else {
        return Err(Error::InvalidParameter {
            name: "images".to_string(),
            reason: "batch must contain at least one image".to_string(),
        });
    };

    if let Some((index, other)) = views
        .iter()
        .enumerate()
        .find(|(_, view)| view.shape() != first.shape())
    {
        return Err(Error::ShapeMismatch {
            expected: format!("{:?}", first.shape()),
            actual: format!("{:?} at index {index}", other.shape()),
        });
    }

    stack(Axis(0), &views).map_err(|err| Error::ShapeMismatch {
        expected: format!("{:?}", first.shape()),
        actual: err.to_string(),
    })
}

/// Replicate a single channel into RGB. Other channel counts pass through.
pub(crate) fn promote_grayscale(tensor: BatchTensor) -> BatchTensor {
    let (batch, height, width, channels) = tensor.dim();
    if channels != 1 {
        return tensor;
    }

    tracing::debug!("Promoting single-channel batch to {RGB_CHANNELS} channels");
    Array4::from_shape_fn((batch, height, width, RGB_CHANNELS), |(n, y, x, _)| {
        tensor[[n, y, x, 0]]
    })
}
