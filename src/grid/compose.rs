//! Copying a batch into a padded canvas.

use ndarray::{s, Array3, Axis};

use crate::error::{Error, Result};
use crate::image::{promote_grayscale, BatchTensor, ImageBatch, ImageTensor};

use super::{GridConfig, GridLayout};

/// Make a grid of images.
///
/// Single-channel batches are promoted to RGB first. The canvas starts out
/// filled with `config.pad_value` and images are placed left to right, top
/// to bottom; trailing cells of the last row stay empty.
///
/// # Errors
///
/// Returns an error if the configuration or the batch is invalid, or if the
/// grid would be too large to encode.
pub fn make_grid<B: Into<ImageBatch>>(images: B, config: &GridConfig) -> Result<ImageTensor> {
    config.validate()?;
    let batch = promote_grayscale(images.into().into_tensor()?);
    compose_batch(&batch, config)
}

/// Compose a validated, promoted batch. The canvas is only allocated once
/// its size is known to be encodable.
pub(crate) fn compose_batch(batch: &BatchTensor, config: &GridConfig) -> Result<ImageTensor> {
    let (count, height, width, channels) = batch.dim();
    let layout = GridLayout::new(count, height, width, config.columns, config.padding)?;
    let (rows, cols) = layout.canvas_size();

    // ndarray caps the element count at isize::MAX
    let elements = rows
        .checked_mul(cols)
        .and_then(|pixels| pixels.checked_mul(channels))
        .filter(|&elements| isize::try_from(elements).is_ok());
    if elements.is_none() {
        return Err(Error::InvalidParameter {
            name: "padding".to_string(),
            reason: format!("grid of {cols}x{rows}x{channels} values is too large to allocate"),
        });
    }

    tracing::debug!(
        "Composing {count} images of {height}x{width}x{channels} into {}x{} grid ({rows}x{cols} px)",
        layout.ymaps,
        layout.xmaps,
    );

    let mut grid = Array3::from_elem((rows, cols, channels), config.pad_value);
    for (index, image) in batch.axis_iter(Axis(0)).enumerate() {
        if let Some((top, left)) = layout.cell_origin(index) {
            grid.slice_mut(s![top..top + height, left..left + width, ..])
                .assign(&image);
        }
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, Array4};

    fn numbered_batch(count: usize, height: usize, width: usize, channels: usize) -> Array4<f32> {
        Array4::from_shape_fn((count, height, width, channels), |(n, _, _, _)| {
            (n + 1) as f32 / 100.0
        })
    }

    #[test]
    fn test_canvas_dims() {
        let config = GridConfig {
            columns: 4,
            padding: 3,
            ..GridConfig::default()
        };
        let grid = make_grid(numbered_batch(10, 6, 5, 3), &config).unwrap();

        // xmaps = 4, ymaps = 3
        assert_eq!(grid.dim(), ((6 + 3) * 3 + 3, (5 + 3) * 4 + 3, 3));
    }

    #[test]
    fn test_single_image_without_padding_is_identity() {
        let image = Array4::from_shape_fn((1, 3, 4, 3), |(_, y, x, c)| {
            (y * 12 + x * 3 + c) as f32 / 36.0
        });
        let config = GridConfig {
            padding: 0,
            ..GridConfig::default()
        };
        let grid = make_grid(image.clone(), &config).unwrap();

        assert_eq!(grid, image.index_axis(Axis(0), 0));
    }

    #[test]
    fn test_full_grid_has_no_padding_inside_cells() {
        let config = GridConfig {
            columns: 3,
            padding: 1,
            pad_value: 0.5,
            ..GridConfig::default()
        };
        let batch = numbered_batch(6, 2, 2, 3);
        let grid = make_grid(batch, &config).unwrap();
        let layout = GridLayout::new(6, 2, 2, 3, 1).unwrap();

        for index in 0..6 {
            let (top, left) = layout.cell_origin(index).unwrap();
            let cell = grid.slice(s![top..top + 2, left..left + 2, ..]);
            let expected = (index + 1) as f32 / 100.0;
            assert!(cell.iter().all(|&v| v == expected), "cell {index}");
        }
    }

    #[test]
    fn test_trailing_cells_are_pad_value() {
        let config = GridConfig {
            columns: 4,
            padding: 2,
            pad_value: 0.75,
            ..GridConfig::default()
        };
        let grid = make_grid(numbered_batch(5, 3, 3, 3), &config).unwrap();

        // second row holds one image; cells 1..4 of that row are empty
        let top = (3 + 2) + 2;
        for x in 1..4 {
            let left = x * (3 + 2) + 2;
            let cell = grid.slice(s![top..top + 3, left..left + 3, ..]);
            assert!(cell.iter().all(|&v| v == 0.75));
        }
    }

    #[test]
    fn test_border_is_pad_value() {
        let config = GridConfig {
            columns: 2,
            padding: 2,
            pad_value: 1.0,
            ..GridConfig::default()
        };
        let grid = make_grid(numbered_batch(2, 4, 4, 3), &config).unwrap();

        assert!(grid.slice(s![0..2, .., ..]).iter().all(|&v| v == 1.0));
        assert!(grid.slice(s![.., 0..2, ..]).iter().all(|&v| v == 1.0));
        assert!(grid.slice(s![.., 6..8, ..]).iter().all(|&v| v == 1.0));
        assert!(grid.slice(s![-2.., .., ..]).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_single_channel_is_promoted() {
        let batch = Array4::from_shape_fn((3, 4, 4, 1), |(n, y, x, _)| {
            (n * 16 + y * 4 + x) as f32 / 48.0
        });
        let config = GridConfig {
            columns: 2,
            ..GridConfig::default()
        };
        let grid = make_grid(batch, &config).unwrap();

        assert_eq!(grid.dim().2, 3);
        for pixel in grid.lanes(Axis(2)) {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
        }
    }

    #[test]
    fn test_list_input() {
        let images = vec![
            Array3::<f32>::ones((2, 2, 3)),
            Array3::<f32>::zeros((2, 2, 3)),
        ];
        let config = GridConfig {
            padding: 0,
            ..GridConfig::default()
        };
        let grid = make_grid(images, &config).unwrap();

        assert_eq!(grid.dim(), (2, 4, 3));
        assert_eq!(grid[[0, 0, 0]], 1.0);
        assert_eq!(grid[[0, 2, 0]], 0.0);
    }

    #[test]
    fn test_invalid_columns_rejected() {
        let config = GridConfig {
            columns: 0,
            ..GridConfig::default()
        };
        let err = make_grid(numbered_batch(2, 2, 2, 3), &config).unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_oversized_grid_rejected_before_allocation() {
        let config = GridConfig {
            padding: 3_000_000_000,
            ..GridConfig::default()
        };
        let err = make_grid(Array4::<f32>::zeros((1, 1, 1, 3)), &config).unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { ref name, .. } if name == "padding"));
    }

    #[test]
    fn test_grid_over_element_limit_rejected() {
        // each side fits in u32, the element count does not fit in isize
        let config = GridConfig {
            padding: 2_000_000_000,
            ..GridConfig::default()
        };
        let err = make_grid(Array4::<f32>::zeros((1, 1, 1, 3)), &config).unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { .. }));
    }
}
