//! scanfilter - clean-up filters for scanned document pages
//!
//! Detects and removes scanning artifacts directly on raw pixel buffers:
//!
//! - **Noise filter** - small isolated dark specks
//! - **Gray filter** - uniformly gray smudges without black content
//!
//! # Example
//!
//! ```rust
//! use scanfilter::{noisefilter, set_pixel, Pixel, PixelFormat, Point, RasterBuffer};
//!
//! let mut page = RasterBuffer::new_white(10, 10, PixelFormat::Gray8);
//! set_pixel(&mut page, Point::new(5, 5), Pixel::BLACK, 170);
//!
//! let removed = noisefilter(&mut page, 5, 200, 170);
//! assert_eq!(removed, 1);
//! ```

pub mod cli;
pub mod config;
pub mod filters;
pub mod job;
pub mod pipeline;
pub mod raster;

pub use cli::{exit_codes, CleanArgs, Cli, Commands, InfoArgs, SUPPORTED_EXTENSIONS};
pub use config::{CliOverrides, Config, ConfigError};
pub use filters::{
    grayfilter, noisefilter, ring_points, FilterError, GrayfilterParameters, Thresholds,
};
pub use job::{FilterJob, JobParameters, JobParametersBuilder};
pub use pipeline::{
    load_raster, save_raster, CleanReport, PipelineConfig, PipelineError, SheetCleaner,
    SheetOutcome, SheetPipeline, SheetReport, SheetTask,
};
pub use raster::{
    center_image, copy_rectangle, count_pixels_within_brightness, get_pixel,
    get_pixel_darkness_inverse, get_pixel_grayscale, get_pixel_lightness, inverse_lightness_rect,
    set_pixel, wipe_rectangle, Extent, Pixel, PixelFormat, Point, RasterBuffer, Rectangle,
};
