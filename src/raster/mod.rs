//! Raster primitives for scanned pages
//!
//! Provides the pixel buffer the filters operate on and the shared
//! pixel/geometry building blocks:
//!
//! # Features
//!
//! - **Buffer** ([`buffer`]) - Grayscale, RGB and bi-level pixel storage
//! - **Pixel** ([`pixel`]) - Grayscale, lightness and darkness classification
//! - **Region** ([`region`]) - Counting, wiping, copying and centering rectangles
//!
//! All coordinates are checked against the buffer before access; region
//! operations clip their rectangles to the buffer first.

pub mod buffer;
pub mod pixel;
pub mod region;
mod types;

// Re-export public API
pub use buffer::{PixelFormat, RasterBuffer};
pub use pixel::{
    get_pixel, get_pixel_darkness_inverse, get_pixel_grayscale, get_pixel_lightness, set_pixel,
    Pixel, BLACK, WHITE,
};
pub use region::{
    center_image, copy_rectangle, count_pixels_within_brightness, inverse_lightness_rect,
    wipe_rectangle,
};
pub use types::{Extent, Point, Rectangle, POINT_ORIGIN};
