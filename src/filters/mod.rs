//! Filters module for scanned page clean-up
//!
//! Provides the correction filters that run in place on a [`RasterBuffer`]:
//!
//! # Features
//!
//! - **Noise filter** ([`noise`]) - Erase small isolated dark specks
//! - **Gray filter** ([`gray`]) - Wipe gray smudges without black content
//!
//! Both filters take absolute `[0, 255]` thresholds; relative values are
//! converted once per job by [`crate::job::FilterJob`].
//!
//! [`RasterBuffer`]: crate::raster::RasterBuffer

pub mod gray;
pub mod noise;
mod types;

// Re-export public API
pub use gray::grayfilter;
pub use noise::{noisefilter, ring_points, Ring};
pub use types::{absolute_level, FilterError, GrayfilterParameters, Result, Thresholds};
