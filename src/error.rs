//! Custom error types for imgrid.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the imgrid library.
#[derive(Error, Debug)]
pub enum Error {
    /// Input is not a batch of images of the expected rank.
    #[error("invalid input type: expected {expected}, got {actual}")]
    InvalidType { expected: String, actual: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Images in a list do not share the same shape.
    #[error("image shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// No output format was given and none could be inferred from the destination.
    #[error("cannot infer image format for {target}; pass a format explicitly")]
    FormatInference { target: String },

    /// The output format has no encoder compiled in.
    #[error("no encoder available for {format} images")]
    UnsupportedFormat { format: String },

    /// The composed image has a channel count no encoder accepts.
    #[error("unsupported channel count {channels}: expected 1, 2, 3 or 4")]
    UnsupportedChannels { channels: usize },

    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode an image into a stream.
    #[error("failed to encode image: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },

    /// Font data could not be parsed.
    #[error("invalid font data: {source}")]
    InvalidFont {
        #[source]
        source: ab_glyph::InvalidFont,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for imgrid operations.
pub type Result<T> = std::result::Result<T, Error>;
