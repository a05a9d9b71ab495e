//! Options controlling grid layout and encoding.

use image::ImageFormat;

use crate::error::{Error, Result};

/// Configuration for composing and saving a grid of images.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Number of images per row. The grid never has more columns than images.
    pub columns: usize,

    /// Border in pixels between cells and around the whole grid.
    pub padding: usize,

    /// Fill value for the border and for empty trailing cells, in input scale.
    pub pad_value: f32,

    /// Output format. `None` infers it from the destination path extension.
    pub format: Option<ImageFormat>,

    /// JPEG quality (1-100), ignored for other formats.
    pub jpeg_quality: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            padding: 2,
            pad_value: 0.0,
            format: None,
            jpeg_quality: 95,
        }
    }
}

impl GridConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            return Err(Error::InvalidParameter {
                name: "columns".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::InvalidParameter {
                name: "jpeg_quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        Ok(())
    }
}
