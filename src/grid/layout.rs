//! Grid geometry.

use crate::error::{Error, Result};

/// Placement of `count` equally sized images in a padded row-major grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    /// Number of images placed.
    pub count: usize,
    /// Images per row, `min(columns, count)`.
    pub xmaps: usize,
    /// Number of rows, `ceil(count / xmaps)`.
    pub ymaps: usize,
    /// Height of one image.
    pub height: usize,
    /// Width of one image.
    pub width: usize,
    /// Border around every cell.
    pub padding: usize,
}

impl GridLayout {
    /// Compute the layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `count` or `columns` is zero,
    /// or if the canvas would be wider or taller than an image can be
    /// (`u32::MAX` pixels).
    pub fn new(
        count: usize,
        height: usize,
        width: usize,
        columns: usize,
        padding: usize,
    ) -> Result<Self> {
        if count == 0 {
            return Err(Error::InvalidParameter {
                name: "images".to_string(),
                reason: "batch must contain at least one image".to_string(),
            });
        }
        if columns == 0 {
            return Err(Error::InvalidParameter {
                name: "columns".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        let xmaps = columns.min(count);
        let ymaps = count.div_ceil(xmaps);

        if canvas_extent(height, ymaps, padding).is_none()
            || canvas_extent(width, xmaps, padding).is_none()
        {
            return Err(Error::InvalidParameter {
                name: "padding".to_string(),
                reason: format!(
                    "{ymaps}x{xmaps} grid of {height}x{width} images with padding {padding} \
                     is too large to encode"
                ),
            });
        }

        Ok(Self {
            count,
            xmaps,
            ymaps,
            height,
            width,
            padding,
        })
    }

    /// Rows between the top edges of two vertically adjacent cells.
    #[must_use]
    pub const fn cell_height(&self) -> usize {
        self.height + self.padding
    }

    /// Columns between the left edges of two horizontally adjacent cells.
    #[must_use]
    pub const fn cell_width(&self) -> usize {
        self.width + self.padding
    }

    /// Canvas size as `(rows, columns)`.
    #[must_use]
    pub const fn canvas_size(&self) -> (usize, usize) {
        (
            self.cell_height() * self.ymaps + self.padding,
            self.cell_width() * self.xmaps + self.padding,
        )
    }

    /// Top-left canvas pixel `(row, column)` of image `index`, or `None` past the batch.
    #[must_use]
    pub const fn cell_origin(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.count {
            return None;
        }
        let (y, x) = (index / self.xmaps, index % self.xmaps);
        Some((
            y * self.cell_height() + self.padding,
            x * self.cell_width() + self.padding,
        ))
    }
}

/// `(size + padding) * cells + padding`, or `None` past `u32::MAX`.
fn canvas_extent(size: usize, cells: usize, padding: usize) -> Option<usize> {
    size.checked_add(padding)?
        .checked_mul(cells)?
        .checked_add(padding)
        .filter(|&extent| u32::try_from(extent).is_ok())
}
