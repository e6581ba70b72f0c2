//! Common types for the filters module

use thiserror::Error;

use crate::raster::Extent;

/// Filter error types
#[derive(Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameters { name: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;

/// Absolute thresholds shared by every filter of a job.
///
/// All values are on the `[0, 255]` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Grayscale at or below which a pixel counts as black content
    pub abs_black_threshold: u8,
    /// Level at or above which a pixel counts as white for noise purposes
    pub min_white_level: u8,
}

/// Sliding window configuration for the gray filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayfilterParameters {
    scan_size: Extent,
    scan_step: Extent,
    abs_threshold: u8,
}

impl GrayfilterParameters {
    /// Build parameters from a window size, a stride and a relative
    /// threshold in `[0.0, 1.0]`.
    pub fn new(scan_size: Extent, scan_step: Extent, threshold: f32) -> Result<Self> {
        if scan_size.is_empty() {
            return Err(FilterError::InvalidParameters {
                name: "grayfilter_size",
                reason: format!(
                    "window must be at least 1x1, got {}x{}",
                    scan_size.horizontal, scan_size.vertical
                ),
            });
        }
        if scan_step.is_empty() {
            return Err(FilterError::InvalidParameters {
                name: "grayfilter_step",
                reason: format!(
                    "step must be at least 1 on both axes, got {}x{}",
                    scan_step.horizontal, scan_step.vertical
                ),
            });
        }
        Ok(Self {
            scan_size,
            scan_step,
            abs_threshold: absolute_level("grayfilter_threshold", threshold)?,
        })
    }

    pub fn scan_size(&self) -> Extent {
        self.scan_size
    }

    pub fn scan_step(&self) -> Extent {
        self.scan_step
    }

    pub fn abs_threshold(&self) -> u8 {
        self.abs_threshold
    }
}

/// Scale a relative level in `[0.0, 1.0]` to `[0, 255]`, truncating
pub fn absolute_level(name: &'static str, relative: f32) -> Result<u8> {
    if !(0.0..=1.0).contains(&relative) {
        return Err(FilterError::InvalidParameters {
            name,
            reason: format!("must be within 0.0..=1.0, got {relative}"),
        });
    }
    Ok((255.0 * relative) as u8)
}
