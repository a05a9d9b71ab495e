//! `imgrid` CLI - Lay out image files as a padded grid or a titled preview figure.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use image::ImageFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use imgrid::image::load_images;
use imgrid::{save_image, show_img_grid, GridConfig};

/// Compose images into a single grid image.
#[derive(Parser, Debug)]
#[command(name = "imgrid")]
#[command(version, about, long_about = None)]
struct Args {
    /// Output image path.
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Input image paths, placed left to right, top to bottom.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Number of images per row.
    #[arg(short, long, default_value = "8", value_name = "INT")]
    columns: usize,

    /// Border in pixels between and around the images.
    #[arg(short, long, default_value = "2", value_name = "INT")]
    padding: usize,

    /// Border colour as a gray level in [0, 1].
    #[arg(long, default_value = "0.0", value_name = "FLOAT")]
    pad_value: f32,

    /// Output format (png, jpg, ...). Inferred from OUTPUT when omitted.
    #[arg(short, long, value_name = "EXT", value_parser = parse_format)]
    format: Option<ImageFormat>,

    /// Output JPEG quality (1-100).
    #[arg(short, long, default_value = "95", value_name = "INT")]
    quality: u8,

    /// Resize every input to WIDTHxHEIGHT before composing.
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    resize: Option<(u32, u32)>,

    /// Draw a grayscale preview figure with file names as titles instead of a grid.
    #[arg(long)]
    figure: bool,

    /// TrueType/OpenType font for figure titles.
    #[arg(long, value_name = "PATH", requires = "figure")]
    font: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("imgrid={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&args) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(args: &Args) -> Result<()> {
    let images = load_images(&args.inputs, args.resize).context("Failed to load input images")?;

    if args.figure {
        let titles: Vec<String> = args.inputs.iter().map(|path| file_stem(path)).collect();
        let mut figure = show_img_grid(&images, &titles).context("Failed to lay out figure")?;

        if let Some(font) = &args.font {
            let data = std::fs::read(font)
                .with_context(|| format!("Failed to read font {}", font.display()))?;
            figure.set_font(data).context("Failed to load font")?;
        }

        figure
            .save(&args.output, args.format)
            .context("Failed to save figure")?;
    } else {
        let config = GridConfig {
            columns: args.columns,
            padding: args.padding,
            pad_value: args.pad_value,
            format: args.format,
            jpeg_quality: args.quality,
        };

        save_image(images, &args.output, &config).context("Failed to save grid")?;
    }

    println!(
        "Successfully wrote {} images to {}",
        args.inputs.len(),
        args.output.display()
    );

    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn parse_format(value: &str) -> std::result::Result<ImageFormat, String> {
    ImageFormat::from_extension(value).ok_or_else(|| format!("unknown image format: {value}"))
}

fn parse_size(value: &str) -> std::result::Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| format!("invalid dimension {s:?} in {value}"))
    };
    Ok((parse(width)?, parse(height)?))
}
