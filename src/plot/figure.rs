//! A raster figure holding a set of axes.

use ab_glyph::{FontArc, PxScale};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::error::{Error, Result};
use crate::image::{write_dynamic, Destination};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FOREGROUND: Rgb<u8> = Rgb([0, 0, 0]);

/// Gap between an axes rectangle and its plot area.
const MARGIN: u32 = 8;
/// Space above the plot area reserved for the title.
const TITLE_BAND: u32 = 24;
const TITLE_SCALE: f32 = 16.0;
const TICK_COUNT: u32 = 5;
const TICK_LENGTH: f32 = 4.0;

/// Handle to one axes of a [`Figure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxesId(usize);

/// A rectangle on a figure that can hold one image and a title.
#[derive(Debug, Clone)]
pub struct Axes {
    rect: (u32, u32, u32, u32),
    title: Option<String>,
    image: Option<GrayImage>,
    ticks: bool,
}

impl Axes {
    fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            rect: (x, y, width, height),
            title: None,
            image: None,
            ticks: true,
        }
    }

    /// Position and size on the figure as `(x, y, width, height)`.
    #[must_use]
    pub const fn rect(&self) -> (u32, u32, u32, u32) {
        self.rect
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) {
        self.title = Some(title.into());
    }

    /// The colour-mapped image shown on these axes, if any.
    #[must_use]
    pub const fn image(&self) -> Option<&GrayImage> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: GrayImage) {
        self.image = Some(image);
    }

    #[must_use]
    pub const fn has_ticks(&self) -> bool {
        self.ticks
    }

    /// Remove the tick marks on both axis edges.
    pub fn clear_ticks(&mut self) {
        self.ticks = false;
    }

    /// Area inside the margins and below the title band.
    fn plot_area(&self) -> (u32, u32, u32, u32) {
        let (x, y, width, height) = self.rect;
        (
            x + MARGIN,
            y + MARGIN + TITLE_BAND,
            width.saturating_sub(2 * MARGIN),
            height.saturating_sub(2 * MARGIN + TITLE_BAND),
        )
    }
}

/// A white raster canvas with axes drawn onto it when rendered.
#[derive(Debug, Clone)]
pub struct Figure {
    width: u32,
    height: u32,
    axes: Vec<Axes>,
    grid: Option<(usize, usize)>,
    current: Option<usize>,
    font: Option<FontArc>,
}

impl Figure {
    /// Edge length of one subplot cell: 3 inches at 72 dpi.
    pub const DEFAULT_CELL: u32 = 216;

    /// Create an empty figure.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            axes: Vec::new(),
            grid: None,
            current: None,
            font: None,
        }
    }

    /// Create a figure with a `rows x cols` grid of square axes, `cell` pixels each.
    ///
    /// The last axes becomes the current one.
    #[must_use]
    pub fn subplots(rows: usize, cols: usize, cell: u32) -> Self {
        let to_u32 = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        let mut figure = Self::new(
            cell.saturating_mul(to_u32(cols)),
            cell.saturating_mul(to_u32(rows)),
        );
        for row in 0..rows {
            for col in 0..cols {
                figure.add_axes(
                    cell.saturating_mul(to_u32(col)),
                    cell.saturating_mul(to_u32(row)),
                    cell,
                    cell,
                );
            }
        }
        figure.grid = Some((rows, cols));
        figure
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Add axes covering the given rectangle and make them current.
    pub fn add_axes(&mut self, x: u32, y: u32, width: u32, height: u32) -> AxesId {
        self.axes.push(Axes::new(x, y, width, height));
        let index = self.axes.len() - 1;
        self.current = Some(index);
        AxesId(index)
    }

    /// Get the current axes, creating one that spans the figure if there are none.
    pub fn gca(&mut self) -> AxesId {
        match self.current {
            Some(index) => AxesId(index),
            None => self.add_axes(0, 0, self.width, self.height),
        }
    }

    /// Axes at `(row, col)` of a figure made by [`Figure::subplots`].
    #[must_use]
    pub fn subplot(&self, row: usize, col: usize) -> Option<AxesId> {
        let (rows, cols) = self.grid?;
        (row < rows && col < cols).then_some(AxesId(row * cols + col))
    }

    /// All axes in creation order.
    pub fn axes(&self) -> impl Iterator<Item = (AxesId, &Axes)> {
        self.axes
            .iter()
            .enumerate()
            .map(|(index, axes)| (AxesId(index), axes))
    }

    #[must_use]
    pub fn get(&self, id: AxesId) -> Option<&Axes> {
        self.axes.get(id.0)
    }

    /// # Errors
    ///
    /// Returns an error if `id` does not belong to this figure.
    pub fn get_mut(&mut self, id: AxesId) -> Result<&mut Axes> {
        let count = self.axes.len();
        self.axes.get_mut(id.0).ok_or_else(|| Error::InvalidParameter {
            name: "axes".to_string(),
            reason: format!("index {} out of range for figure with {count} axes", id.0),
        })
    }

    /// Install the font used to draw titles. Without one, titles are kept but not drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is not a TrueType or OpenType font.
    pub fn set_font(&mut self, data: Vec<u8>) -> Result<()> {
        let font = FontArc::try_from_vec(data).map_err(|source| Error::InvalidFont { source })?;
        self.font = Some(font);
        Ok(())
    }

    /// Draw the figure.
    #[must_use]
    pub fn render(&self) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.width, self.height, BACKGROUND);
        for axes in &self.axes {
            self.draw_axes(&mut canvas, axes);
        }
        canvas
    }

    /// Render the figure and save it.
    ///
    /// # Errors
    ///
    /// Returns an error if the format cannot be determined or has no
    /// encoder, or if the image cannot be written.
    pub fn save<'a, D: Into<Destination<'a>>>(
        &self,
        destination: D,
        format: Option<ImageFormat>,
    ) -> Result<()> {
        let destination = destination.into();
        let format = destination.resolve_format(format)?;
        let image = DynamicImage::ImageRgb8(self.render());
        write_dynamic(&image, destination, format, 95)
    }

    #[allow(clippy::cast_possible_wrap)]
    fn draw_axes(&self, canvas: &mut RgbImage, axes: &Axes) {
        let (x, y, width, height) = axes.plot_area();
        if width == 0 || height == 0 {
            return;
        }

        // the frame hugs the image, as with an equal-aspect image plot
        let (fx, fy, fw, fh) = match &axes.image {
            Some(image) if image.width() > 0 && image.height() > 0 => {
                let (dw, dh) = fit(image.dimensions(), (width, height));
                let (dx, dy) = (x + (width - dw) / 2, y + (height - dh) / 2);
                let scaled = imageops::resize(image, dw, dh, FilterType::Nearest);
                let rgb = DynamicImage::ImageLuma8(scaled).to_rgb8();
                imageops::overlay(canvas, &rgb, i64::from(dx), i64::from(dy));
                (dx, dy, dw, dh)
            }
            _ => (x, y, width, height),
        };

        draw_hollow_rect_mut(
            canvas,
            Rect::at(fx as i32 - 1, fy as i32 - 1).of_size(fw + 2, fh + 2),
            FOREGROUND,
        );

        if axes.ticks {
            draw_ticks(canvas, (fx, fy, fw, fh));
        }

        if let (Some(title), Some(font)) = (axes.title(), &self.font) {
            let (text_width, _) = text_size(PxScale::from(TITLE_SCALE), font, title);
            let (ax, ay, aw, _) = axes.rect;
            let left = ax + aw.saturating_sub(text_width) / 2;
            draw_text_mut(
                canvas,
                FOREGROUND,
                left as i32,
                (ay + MARGIN) as i32,
                PxScale::from(TITLE_SCALE),
                font,
                title,
            );
        }
    }
}

/// Largest size with the aspect ratio of `image` that fits in `area`.
#[allow(clippy::cast_possible_truncation)]
fn fit(image: (u32, u32), area: (u32, u32)) -> (u32, u32) {
    let (iw, ih) = (u64::from(image.0), u64::from(image.1));
    let (aw, ah) = (u64::from(area.0), u64::from(area.1));

    // Safe: each result is bounded by the matching area dimension
    if iw * ah <= ih * aw {
        (((iw * ah) / ih).max(1) as u32, area.1)
    } else {
        (area.0, ((ih * aw) / iw).max(1) as u32)
    }
}

#[allow(clippy::cast_precision_loss)]
fn draw_ticks(canvas: &mut RgbImage, (x, y, width, height): (u32, u32, u32, u32)) {
    let (left, top) = (x as f32, y as f32);
    let (right, bottom) = ((x + width) as f32, (y + height) as f32);

    for i in 0..TICK_COUNT {
        let t = i as f32 / (TICK_COUNT - 1) as f32;
        let tx = (right - left).mul_add(t, left);
        let ty = (bottom - top).mul_add(t, top);
        draw_line_segment_mut(canvas, (tx, bottom), (tx, bottom + TICK_LENGTH), FOREGROUND);
        draw_line_segment_mut(canvas, (left - TICK_LENGTH, ty), (left, ty), FOREGROUND);
    }
}
