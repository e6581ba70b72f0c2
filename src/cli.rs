//! Command line interface definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::CliOverrides;
use crate::raster::{Extent, PixelFormat};

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const INVALID_ARGS: i32 = 2;
    pub const INPUT_NOT_FOUND: i32 = 3;
}

/// Image file extensions picked up when the input is a directory
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "tif", "tiff", "pnm", "pbm", "pgm", "ppm", "bmp", "jpg", "jpeg",
];

#[derive(Debug, Parser)]
#[command(
    name = "scanfilter",
    version,
    about = "Remove specks and gray smudges from scanned pages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Clean one page image or a directory of them
    Clean(CleanArgs),
    /// Show version, effective settings and config file locations
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    /// Config file to read instead of the default locations
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Input image file or directory
    pub input: PathBuf,

    /// Output image file, or directory when the input is a directory
    pub output: PathBuf,

    /// Config file to read instead of the default locations
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Darkness fraction above which pixels count as black (0.0-1.0)
    #[arg(long)]
    pub black_threshold: Option<f32>,

    /// Brightness fraction above which pixels count as white (0.0-1.0)
    #[arg(long)]
    pub white_threshold: Option<f32>,

    /// Largest dark cluster, in pixels, removed as noise
    #[arg(long)]
    pub noisefilter_intensity: Option<u64>,

    /// Disable the noise filter
    #[arg(long)]
    pub no_noisefilter: bool,

    /// Gray filter window size as WIDTH,HEIGHT
    #[arg(long, value_parser = parse_extent)]
    pub grayfilter_size: Option<Extent>,

    /// Gray filter step as HORIZONTAL,VERTICAL
    #[arg(long, value_parser = parse_extent)]
    pub grayfilter_step: Option<Extent>,

    /// Inverse lightness fraction below which a window is wiped (0.0-1.0)
    #[arg(long)]
    pub grayfilter_threshold: Option<f32>,

    /// Disable the gray filter
    #[arg(long)]
    pub no_grayfilter: bool,

    /// Pixel format of written pages (gray8, rgb24, mono)
    #[arg(long, value_parser = parse_pixel_format)]
    pub pixel_format: Option<PixelFormat>,

    /// Worker threads for directory input (default: all CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Replace existing output files
    #[arg(long)]
    pub overwrite: bool,

    /// Print per-page reports as JSON
    #[arg(long)]
    pub json: bool,

    /// Show what would be processed without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl CleanArgs {
    /// Options given explicitly on the command line
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            black_threshold: self.black_threshold,
            white_threshold: self.white_threshold,
            noisefilter: self.no_noisefilter.then_some(false),
            noisefilter_intensity: self.noisefilter_intensity,
            grayfilter: self.no_grayfilter.then_some(false),
            grayfilter_size: self.grayfilter_size,
            grayfilter_step: self.grayfilter_step,
            grayfilter_threshold: self.grayfilter_threshold,
            threads: self.threads,
            pixel_format: self.pixel_format,
            overwrite: self.overwrite.then_some(true),
        }
    }
}

/// Parse `W,H` (or a single `N` for a square) into an [`Extent`]
pub fn parse_extent(value: &str) -> Result<Extent, String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid size '{}': {}", part.trim(), e))
    };
    match value.split_once(',') {
        Some((h, v)) => Ok(Extent::new(parse(h)?, parse(v)?)),
        None => Ok(Extent::square(parse(value)?)),
    }
}

/// Parse a pixel format name
pub fn parse_pixel_format(value: &str) -> Result<PixelFormat, String> {
    match value.to_ascii_lowercase().as_str() {
        "gray8" | "gray" | "grey" => Ok(PixelFormat::Gray8),
        "rgb24" | "rgb" => Ok(PixelFormat::Rgb24),
        "mono" | "bw" => Ok(PixelFormat::Mono),
        other => Err(format!("unknown pixel format '{other}' (expected gray8, rgb24 or mono)")),
    }
}
