//! Image saving utilities.

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageResult, LumaA, Rgb, Rgba};
use ndarray::Array3;

use crate::error::{Error, Result};
use crate::grid::{compose_batch, GridConfig};

use super::{promote_grayscale, ImageBatch, ImageTensor};

/// A writable, seekable byte sink. Implemented for every `Write + Seek` type.
pub trait WriteSeek: Write + Seek {}

impl<T: Write + Seek + ?Sized> WriteSeek for T {}

/// Where an encoded image goes.
///
/// Paths are created or overwritten. Streams stay owned by the caller and
/// carry no name, so the format must be given explicitly.
pub enum Destination<'a> {
    /// A file on disk; the format may be inferred from its extension.
    Path(PathBuf),
    /// An open stream.
    Stream(&'a mut dyn WriteSeek),
}

impl Destination<'_> {
    /// Resolve the output format, inferring it from the file extension if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FormatInference`] when `format` is `None` and the
    /// destination is a stream or has no recognised extension, and
    /// [`Error::UnsupportedFormat`] when no encoder for the format is built in.
    pub fn resolve_format(&self, format: Option<ImageFormat>) -> Result<ImageFormat> {
        let format = match (format, self) {
            (Some(format), _) => format,
            (None, Self::Path(path)) => {
                ImageFormat::from_path(path).map_err(|_| Error::FormatInference {
                    target: path.display().to_string(),
                })?
            }
            (None, Self::Stream(_)) => {
                return Err(Error::FormatInference {
                    target: "stream".to_string(),
                })
            }
        };

        if !format.writing_enabled() {
            return Err(Error::UnsupportedFormat {
                format: format!("{format:?}"),
            });
        }

        Ok(format)
    }
}

impl From<PathBuf> for Destination<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for Destination<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&PathBuf> for Destination<'_> {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}

impl From<&str> for Destination<'_> {
    fn from(path: &str) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl From<String> for Destination<'_> {
    fn from(path: String) -> Self {
        Self::Path(PathBuf::from(path))
    }
}

impl<'a, W: Write + Seek + 'a> From<&'a mut W> for Destination<'a> {
    fn from(stream: &'a mut W) -> Self {
        Self::Stream(stream)
    }
}

/// Make a grid of images and save it.
///
/// The batch is:
/// 1. Validated (rank, shapes, configuration, grid size, output format)
/// 2. Promoted to RGB if it has a single channel
/// 3. Composed into a padded grid
/// 4. Scaled from [0, 1] to bytes with round-to-nearest
/// 5. Encoded and written to `destination`
///
/// Nothing is written when validation fails.
///
/// # Arguments
///
/// * `images` - 4-D batch or list of 3-D images, values in [0, 1]
/// * `destination` - Output path or stream
/// * `config` - Grid layout and encoding options
///
/// # Errors
///
/// Returns an error if the input is invalid, the format cannot be
/// determined, or the image cannot be encoded or written.
pub fn save_image<'a, B, D>(images: B, destination: D, config: &GridConfig) -> Result<()>
where
    B: Into<ImageBatch>,
    D: Into<Destination<'a>>,
{
    config.validate()?;
    let destination = destination.into();

    let batch = promote_grayscale(images.into().into_tensor()?);
    let channels = batch.dim().3;
    if !(2..=4).contains(&channels) {
        return Err(Error::UnsupportedChannels { channels });
    }
    let format = destination.resolve_format(config.format)?;

    let grid = compose_batch(&batch, config)?;
    let image = tensor_to_image(&grid)?;

    write_dynamic(&image, destination, format, config.jpeg_quality)
}

/// Make a grid of images and encode it into `writer` as `format`.
///
/// # Errors
///
/// Same as [`save_image`], minus format inference.
pub fn write_image<B, W>(
    images: B,
    writer: &mut W,
    format: ImageFormat,
    config: &GridConfig,
) -> Result<()>
where
    B: Into<ImageBatch>,
    W: Write + Seek,
{
    let config = GridConfig {
        format: Some(format),
        ..config.clone()
    };
    save_image(images, writer, &config)
}

/// Scale a [0, 1] canvas to bytes.
#[must_use]
pub fn quantize(canvas: &ImageTensor) -> Array3<u8> {
    canvas.mapv(to_byte)
}

/// Scale a value from [0, 1] to [0, 255], rounding to nearest.
///
/// Clipping happens after the `+ 0.5` so that 1.0 lands on 255.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(value: f32) -> u8 {
    // Safe: clamped to [0, 255] before casting; NaN casts to 0
    (value * 255.0 + 0.5).clamp(0.0, 255.0) as u8
}

/// Convert an HWC float canvas to an encodable image.
fn tensor_to_image(canvas: &ImageTensor) -> Result<DynamicImage> {
    let (height, width, channels) = canvas.dim();
    let too_large = |_| Error::InvalidParameter {
        name: "images".to_string(),
        reason: format!("grid of {width}x{height} pixels is too large to encode"),
    };
    let (w, h) = (
        u32::try_from(width).map_err(too_large)?,
        u32::try_from(height).map_err(too_large)?,
    );

    let raw: Vec<u8> = quantize(canvas).iter().copied().collect();
    let mismatch = || Error::ShapeMismatch {
        expected: format!("{width}x{height}x{channels} buffer"),
        actual: "buffer of a different size".to_string(),
    };

    let image = match channels {
        2 => DynamicImage::ImageLumaA8(
            ImageBuffer::<LumaA<u8>, _>::from_raw(w, h, raw).ok_or_else(mismatch)?,
        ),
        3 => DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, raw).ok_or_else(mismatch)?,
        ),
        4 => DynamicImage::ImageRgba8(
            ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, raw).ok_or_else(mismatch)?,
        ),
        _ => return Err(Error::UnsupportedChannels { channels }),
    };

    Ok(image)
}

/// Encode `image` as `format` and write it to `destination`.
pub(crate) fn write_dynamic(
    image: &DynamicImage,
    destination: Destination<'_>,
    format: ImageFormat,
    quality: u8,
) -> Result<()> {
    match destination {
        Destination::Path(path) => {
            tracing::info!("Saving {format:?} image to: {}", path.display());
            let mut writer = BufWriter::new(File::create(&path)?);
            encode(image, &mut writer, format, quality)
                .map_err(|source| Error::ImageSave { path, source })?;
            writer.flush()?;
        }
        Destination::Stream(mut stream) => {
            tracing::info!("Encoding {format:?} image to stream");
            encode(image, &mut stream, format, quality).map_err(|source| Error::Encode { source })?;
        }
    }

    Ok(())
}

fn encode<W: Write + Seek>(
    image: &DynamicImage,
    writer: &mut W,
    format: ImageFormat,
    quality: u8,
) -> ImageResult<()> {
    match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(writer, quality);
            image.write_with_encoder(encoder)
        }
        _ => image.write_to(writer, format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array3, Array4, IxDyn};
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case(0.0, 0)]
    #[case(1.0, 255)]
    #[case(0.5, 128)]
    #[case(0.2, 51)]
    #[case(-0.25, 0)]
    #[case(2.0, 255)]
    #[case(f32::NAN, 0)]
    fn test_to_byte(#[case] value: f32, #[case] expected: u8) {
        assert_eq!(to_byte(value), expected);
    }

    #[test]
    fn test_to_byte_rounds_to_nearest() {
        for byte in 0..=255u8 {
            assert_eq!(to_byte(f32::from(byte) / 255.0), byte);
        }
    }

    #[test]
    fn test_quantize_shape() {
        let canvas = Array3::<f32>::from_elem((3, 5, 3), 0.5);
        let bytes = quantize(&canvas);

        assert_eq!(bytes.dim(), (3, 5, 3));
        assert!(bytes.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_png_stream_round_trip() {
        let batch = Array4::from_shape_fn((1, 2, 3, 3), |(_, y, x, c)| {
            f32::from(u8::try_from(y * 9 + x * 3 + c).unwrap()) / 255.0
        });
        let config = GridConfig {
            padding: 0,
            ..GridConfig::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        write_image(batch, &mut cursor, ImageFormat::Png, &config).unwrap();

        let decoded = image::load_from_memory(cursor.get_ref()).unwrap().to_rgb8();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [0, 1, 2]);
        assert_eq!(decoded.get_pixel(2, 1).0, [15, 16, 17]);
    }

    #[test]
    fn test_stream_without_format() {
        let mut cursor = Cursor::new(Vec::new());
        let err = save_image(
            Array4::<f32>::zeros((1, 2, 2, 3)),
            &mut cursor,
            &GridConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::FormatInference { .. }));
        assert!(cursor.get_ref().is_empty());
    }

    #[test]
    fn test_format_inferred_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        save_image(
            Array4::<f32>::ones((3, 4, 4, 1)),
            &path,
            &GridConfig::default(),
        )
        .unwrap();

        assert_eq!(image::ImageFormat::from_path(&path).unwrap(), ImageFormat::Png);
        let decoded = image::open(&path).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
        // 3 images, 3 columns, 4 px each, padding 2
        assert_eq!((decoded.width(), decoded.height()), (20, 8));
        assert_eq!(decoded.to_rgb8().get_pixel(2, 2).0, [255, 255, 255]);
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        let config = GridConfig {
            format: Some(ImageFormat::Jpeg),
            jpeg_quality: 80,
            ..GridConfig::default()
        };
        save_image(Array4::<f32>::zeros((2, 8, 8, 3)), &path, &config).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_unknown_extension_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknown");
        let err = save_image(
            Array4::<f32>::zeros((1, 2, 2, 3)),
            &path,
            &GridConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::FormatInference { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_invalid_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let images = vec![
            Array3::<f32>::zeros((2, 2, 3)),
            Array3::<f32>::zeros((3, 2, 3)),
        ];
        let err = save_image(images, &path, &GridConfig::default()).unwrap_err();

        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(!path.exists());

        let config = GridConfig {
            columns: 0,
            ..GridConfig::default()
        };
        let err = save_image(Array4::<f32>::zeros((1, 2, 2, 3)), &path, &config).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert!(!path.exists());

        let image = Array::<f32, _>::zeros(IxDyn(&[2, 2, 3]));
        let err = save_image(image, &path, &GridConfig::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidType { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_oversized_grid_writes_nothing() {
        let config = GridConfig {
            padding: 3_000_000_000,
            ..GridConfig::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        let err = write_image(
            Array4::<f32>::zeros((1, 1, 1, 3)),
            &mut cursor,
            ImageFormat::Png,
            &config,
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert!(cursor.get_ref().is_empty());
    }

    #[test]
    fn test_format_without_encoder_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        std::fs::write(&path, b"previous contents").unwrap();

        let err = save_image(
            Array4::<f32>::zeros((1, 2, 2, 3)),
            &path,
            &GridConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert_eq!(std::fs::read(&path).unwrap(), b"previous contents");
    }

    #[test]
    fn test_explicit_format_without_encoder() {
        let mut cursor = Cursor::new(Vec::new());
        let err = write_image(
            Array4::<f32>::zeros((1, 2, 2, 3)),
            &mut cursor,
            ImageFormat::Gif,
            &GridConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnsupportedFormat { .. }));
        assert!(cursor.get_ref().is_empty());
    }

    #[test]
    fn test_unsupported_channels() {
        let mut cursor = Cursor::new(Vec::new());
        let err = write_image(
            Array4::<f32>::zeros((1, 2, 2, 5)),
            &mut cursor,
            ImageFormat::Png,
            &GridConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::UnsupportedChannels { channels: 5 }));
    }

    #[test]
    fn test_rgba_png() {
        let mut cursor = Cursor::new(Vec::new());
        write_image(
            Array4::<f32>::ones((2, 2, 2, 4)),
            &mut cursor,
            ImageFormat::Png,
            &GridConfig::default(),
        )
        .unwrap();

        let decoded = image::load_from_memory(cursor.get_ref()).unwrap();
        assert!(matches!(decoded, DynamicImage::ImageRgba8(_)));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let err = save_image(
            Array4::<f32>::zeros((1, 2, 2, 3)),
            &path,
            &GridConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::Io(_)));
    }
}
