//! Job parameters
//!
//! Users configure thresholds as fractions in `[0.0, 1.0]`. A [`FilterJob`]
//! converts them once into the absolute `[0, 255]` values the filters use.

use serde::{Deserialize, Serialize};

use crate::filters::{absolute_level, GrayfilterParameters, Result, Thresholds};
use crate::raster::Extent;

// ============================================================
// Constants
// ============================================================

/// Darkness fraction at which a pixel counts as black
pub const DEFAULT_BLACK_THRESHOLD: f32 = 0.33;

/// Brightness fraction at which a pixel counts as white
pub const DEFAULT_WHITE_THRESHOLD: f32 = 0.9;

/// Largest cluster the noise filter removes
pub const DEFAULT_NOISEFILTER_INTENSITY: u64 = 4;

/// Gray filter window edge in pixels
pub const DEFAULT_GRAYFILTER_SIZE: u32 = 50;

/// Gray filter stride in pixels
pub const DEFAULT_GRAYFILTER_STEP: u32 = 20;

/// Inverse lightness fraction below which a window is wiped
pub const DEFAULT_GRAYFILTER_THRESHOLD: f32 = 0.5;

// ============================================================
// Types
// ============================================================

/// User-facing filter parameters with relative thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobParameters {
    /// Darkness fraction; pixels darker than `1 - black_threshold` are black
    pub black_threshold: f32,

    /// Brightness fraction; pixels at least this bright are white
    pub white_threshold: f32,

    /// Run the noise filter
    pub noisefilter: bool,

    /// Largest cluster size (pixels) the noise filter removes
    pub noisefilter_intensity: u64,

    /// Run the gray filter
    pub grayfilter: bool,

    /// Gray filter window size
    pub grayfilter_size: Extent,

    /// Gray filter window stride
    pub grayfilter_step: Extent,

    /// Relative gray filter threshold
    pub grayfilter_threshold: f32,
}

impl Default for JobParameters {
    fn default() -> Self {
        Self {
            black_threshold: DEFAULT_BLACK_THRESHOLD,
            white_threshold: DEFAULT_WHITE_THRESHOLD,
            noisefilter: true,
            noisefilter_intensity: DEFAULT_NOISEFILTER_INTENSITY,
            grayfilter: true,
            grayfilter_size: Extent::square(DEFAULT_GRAYFILTER_SIZE),
            grayfilter_step: Extent::square(DEFAULT_GRAYFILTER_STEP),
            grayfilter_threshold: DEFAULT_GRAYFILTER_THRESHOLD,
        }
    }
}

impl JobParameters {
    /// Create a builder
    pub fn builder() -> JobParametersBuilder {
        JobParametersBuilder::default()
    }
}

/// Builder for JobParameters
#[derive(Debug, Default)]
pub struct JobParametersBuilder {
    params: JobParameters,
}

impl JobParametersBuilder {
    #[must_use]
    pub fn black_threshold(mut self, threshold: f32) -> Self {
        self.params.black_threshold = threshold;
        self
    }

    #[must_use]
    pub fn white_threshold(mut self, threshold: f32) -> Self {
        self.params.white_threshold = threshold;
        self
    }

    #[must_use]
    pub fn noisefilter(mut self, enabled: bool) -> Self {
        self.params.noisefilter = enabled;
        self
    }

    #[must_use]
    pub fn noisefilter_intensity(mut self, intensity: u64) -> Self {
        self.params.noisefilter_intensity = intensity;
        self
    }

    #[must_use]
    pub fn grayfilter(mut self, enabled: bool) -> Self {
        self.params.grayfilter = enabled;
        self
    }

    #[must_use]
    pub fn grayfilter_size(mut self, size: Extent) -> Self {
        self.params.grayfilter_size = size;
        self
    }

    #[must_use]
    pub fn grayfilter_step(mut self, step: Extent) -> Self {
        self.params.grayfilter_step = step;
        self
    }

    #[must_use]
    pub fn grayfilter_threshold(mut self, threshold: f32) -> Self {
        self.params.grayfilter_threshold = threshold;
        self
    }

    #[must_use]
    pub fn build(self) -> JobParameters {
        self.params
    }
}

/// Resolved, validated parameters for one clean-up run.
///
/// Immutable once built; shared by reference with every filter call.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterJob {
    pub thresholds: Thresholds,
    pub noisefilter: Option<u64>,
    pub grayfilter: Option<GrayfilterParameters>,
}

impl FilterJob {
    /// Validate `params` and compute the absolute thresholds.
    ///
    /// The black threshold is a darkness fraction, so its absolute value is
    /// `255 * (1 - black_threshold)`; the others scale directly.
    pub fn initialize(params: &JobParameters) -> Result<Self> {
        let thresholds = Thresholds {
            abs_black_threshold: absolute_level("black_threshold", 1.0 - params.black_threshold)?,
            min_white_level: absolute_level("white_threshold", params.white_threshold)?,
        };

        let grayfilter = if params.grayfilter {
            Some(GrayfilterParameters::new(
                params.grayfilter_size,
                params.grayfilter_step,
                params.grayfilter_threshold,
            )?)
        } else {
            None
        };

        Ok(Self {
            thresholds,
            noisefilter: params.noisefilter.then_some(params.noisefilter_intensity),
            grayfilter,
        })
    }
}
