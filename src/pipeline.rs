//! Sheet pipeline
//!
//! Glue around the filters: load a page, run the enabled filters in a fixed
//! order (noise, then gray), save the result. Batches of pages run in
//! parallel on a rayon pool, one buffer per worker.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::filters::{grayfilter, noisefilter, FilterError};
use crate::job::{FilterJob, JobParameters};
use crate::raster::{PixelFormat, RasterBuffer};

// ============================================================
// Errors
// ============================================================

/// Pipeline error types
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Invalid image {path}: {message}")]
    InvalidImage { path: PathBuf, message: String },

    #[error("Failed to save {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("Output already exists: {0} (use --overwrite to replace it)")]
    OutputExists(PathBuf),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// ============================================================
// Configuration
// ============================================================

/// Fully merged settings for a pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineConfig {
    pub params: JobParameters,
    pub threads: Option<usize>,
    pub pixel_format: Option<PixelFormat>,
    pub overwrite: bool,
}

impl PipelineConfig {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Worker count for batch runs
    pub fn effective_threads(&self) -> usize {
        self.threads.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

// ============================================================
// Reports
// ============================================================

/// What the filters did to one page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Noise clusters removed, `None` when the filter was disabled
    pub noise_clusters: Option<u64>,
    /// Pixels wiped by the gray filter, `None` when the filter was disabled
    pub gray_pixels: Option<u64>,
}

/// Result of processing one file
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    #[serde(flatten)]
    pub clean: CleanReport,
    pub elapsed_seconds: f64,
}

/// One input/output pair of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl SheetTask {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Outcome of one batch task
#[derive(Debug)]
pub struct SheetOutcome {
    pub task: SheetTask,
    pub result: Result<SheetReport>,
}

// ============================================================
// Sheet Cleaner
// ============================================================

/// Runs the enabled filters of a job on a buffer
#[derive(Debug, Clone)]
pub struct SheetCleaner {
    job: FilterJob,
}

impl SheetCleaner {
    pub fn new(job: FilterJob) -> Self {
        Self { job }
    }

    pub fn job(&self) -> &FilterJob {
        &self.job
    }

    /// Apply the noise filter, then the gray filter, in place
    pub fn clean(&self, buffer: &mut RasterBuffer) -> CleanReport {
        let thresholds = self.job.thresholds;
        let mut report = CleanReport::default();

        if let Some(intensity) = self.job.noisefilter {
            let removed = noisefilter(
                buffer,
                intensity,
                thresholds.min_white_level,
                thresholds.abs_black_threshold,
            );
            debug!(removed, "Noise filter applied");
            report.noise_clusters = Some(removed);
        }

        if let Some(params) = &self.job.grayfilter {
            let wiped = grayfilter(buffer, params, thresholds.abs_black_threshold);
            debug!(wiped, "Gray filter applied");
            report.gray_pixels = Some(wiped);
        }

        report
    }
}

// ============================================================
// Image I/O
// ============================================================

/// Decode an image file into a buffer
pub fn load_raster(path: &Path) -> Result<RasterBuffer> {
    if !path.exists() {
        return Err(PipelineError::ImageNotFound(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|e| PipelineError::InvalidImage {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(RasterBuffer::from_dynamic(image))
}

/// Encode a buffer, converting it to `format` first when given.
///
/// The file type follows the extension of `path`.
pub fn save_raster(
    buffer: RasterBuffer,
    path: &Path,
    format: Option<PixelFormat>,
    abs_black_threshold: u8,
) -> Result<()> {
    let buffer = match format {
        Some(format) if format != buffer.format() => buffer.to_format(format, abs_black_threshold),
        _ => buffer,
    };
    buffer
        .into_dynamic()
        .save(path)
        .map_err(|e| PipelineError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

// ============================================================
// Sheet Pipeline
// ============================================================

/// Loads, cleans and saves page images
#[derive(Debug, Clone)]
pub struct SheetPipeline {
    config: PipelineConfig,
    cleaner: SheetCleaner,
}

impl SheetPipeline {
    /// Validate the configuration and prepare the filters
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let job = FilterJob::initialize(&config.params)?;
        Ok(Self {
            config,
            cleaner: SheetCleaner::new(job),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cleaner(&self) -> &SheetCleaner {
        &self.cleaner
    }

    /// Clean a single file
    #[instrument(skip_all, fields(input = %input.display()))]
    pub fn process_file(&self, input: &Path, output: &Path) -> Result<SheetReport> {
        let start = Instant::now();

        if output.exists() && !self.config.overwrite {
            return Err(PipelineError::OutputExists(output.to_path_buf()));
        }

        let mut buffer = load_raster(input)?;
        let (width, height, format) = (buffer.width(), buffer.height(), buffer.format());
        debug!(width, height, format = format.name(), "Page loaded");

        let clean = self.cleaner.clean(&mut buffer);

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        save_raster(
            buffer,
            output,
            self.config.pixel_format,
            self.cleaner.job().thresholds.abs_black_threshold,
        )?;

        let elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            output = %output.display(),
            noise_clusters = clean.noise_clusters,
            gray_pixels = clean.gray_pixels,
            elapsed_seconds,
            "Page cleaned"
        );

        Ok(SheetReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            width,
            height,
            format,
            clean,
            elapsed_seconds,
        })
    }

    /// Clean many files in parallel.
    ///
    /// Outcomes come back in task order; `on_done` is called from the worker
    /// threads as each task finishes.
    pub fn process_batch<F>(&self, tasks: &[SheetTask], on_done: F) -> Result<Vec<SheetOutcome>>
    where
        F: Fn(&SheetOutcome) + Send + Sync,
    {
        let threads = self.config.effective_threads();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        info!(files = tasks.len(), threads, "Starting batch");

        let outcomes: Vec<SheetOutcome> = pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    let outcome = SheetOutcome {
                        task: task.clone(),
                        result: self.process_file(&task.input, &task.output),
                    };
                    if let Err(e) = &outcome.result {
                        warn!(input = %task.input.display(), error = %e, "Page failed");
                    }
                    on_done(&outcome);
                    outcome
                })
                .collect()
        });

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{get_pixel, set_pixel, Pixel, Point};
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    fn speckled_page() -> GrayImage {
        let mut image = GrayImage::from_pixel(40, 40, Luma([255]));
        image.put_pixel(10, 10, Luma([0]));
        image.put_pixel(30, 5, Luma([0]));
        image
    }

    #[test]
    fn test_cleaner_runs_enabled_filters() {
        let job = FilterJob::initialize(&JobParameters::default()).unwrap();
        let cleaner = SheetCleaner::new(job);

        let mut buffer = RasterBuffer::new_white(60, 60, PixelFormat::Gray8);
        set_pixel(&mut buffer, Point::new(20, 20), Pixel::BLACK, 0);

        let report = cleaner.clean(&mut buffer);
        assert_eq!(report.noise_clusters, Some(1));
        assert_eq!(report.gray_pixels, Some(0));
        assert_eq!(get_pixel(&buffer, Point::new(20, 20)), Some(Pixel::WHITE));
    }

    #[test]
    fn test_cleaner_skips_disabled_filters() {
        let params = JobParameters::builder().noisefilter(false).grayfilter(false).build();
        let cleaner = SheetCleaner::new(FilterJob::initialize(&params).unwrap());

        let mut buffer = RasterBuffer::new_white(10, 10, PixelFormat::Gray8);
        set_pixel(&mut buffer, Point::new(5, 5), Pixel::BLACK, 0);

        assert_eq!(cleaner.clean(&mut buffer), CleanReport::default());
        assert_eq!(get_pixel(&buffer, Point::new(5, 5)), Some(Pixel::BLACK));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PipelineConfig {
            params: JobParameters::builder().grayfilter_threshold(2.0).build(),
            ..Default::default()
        };
        assert!(matches!(SheetPipeline::new(config), Err(PipelineError::Filter(_))));
    }

    #[test]
    fn test_process_file_roundtrip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("page.png");
        let output = dir.path().join("out").join("page.png");
        speckled_page().save(&input).unwrap();

        let pipeline = SheetPipeline::new(PipelineConfig::default()).unwrap();
        let report = pipeline.process_file(&input, &output).unwrap();

        assert_eq!(report.clean.noise_clusters, Some(2));
        assert_eq!((report.width, report.height), (40, 40));
        assert_eq!(report.format, PixelFormat::Gray8);

        let cleaned = image::open(&output).unwrap().to_luma8();
        assert!(cleaned.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_process_file_missing_input() {
        let dir = tempdir().unwrap();
        let pipeline = SheetPipeline::new(PipelineConfig::default()).unwrap();
        let result =
            pipeline.process_file(&dir.path().join("missing.png"), &dir.path().join("o.png"));
        assert!(matches!(result, Err(PipelineError::ImageNotFound(_))));
    }

    #[test]
    fn test_process_file_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("page.png");
        speckled_page().save(&input).unwrap();

        let pipeline = SheetPipeline::new(PipelineConfig::default()).unwrap();
        let result = pipeline.process_file(&input, &input);
        assert!(matches!(result, Err(PipelineError::OutputExists(_))));
    }

    #[test]
    fn test_save_as_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mono.png");
        let mut buffer = RasterBuffer::new_white(4, 1, PixelFormat::Gray8);
        set_pixel(&mut buffer, Point::new(0, 0), Pixel::gray(60), 0);
        set_pixel(&mut buffer, Point::new(1, 0), Pixel::gray(200), 0);

        save_raster(buffer, &path, Some(PixelFormat::Mono), 170).unwrap();

        let saved = image::open(&path).unwrap().to_luma8();
        assert_eq!(saved.get_pixel(0, 0).0[0], 0);
        assert_eq!(saved.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_process_batch_keeps_order() {
        let dir = tempdir().unwrap();
        let mut tasks = Vec::new();
        for i in 0..4 {
            let input = dir.path().join(format!("in_{i}.png"));
            speckled_page().save(&input).unwrap();
            tasks.push(SheetTask::new(input, dir.path().join(format!("out_{i}.png"))));
        }
        tasks.push(SheetTask::new(dir.path().join("absent.png"), dir.path().join("x.png")));

        let config = PipelineConfig {
            threads: Some(2),
            ..Default::default()
        };
        let pipeline = SheetPipeline::new(config).unwrap();
        let done = std::sync::atomic::AtomicUsize::new(0);
        let outcomes = pipeline
            .process_batch(&tasks, |_| {
                done.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            })
            .unwrap();

        assert_eq!(done.load(std::sync::atomic::Ordering::SeqCst), 5);
        assert_eq!(outcomes.len(), 5);
        for (task, outcome) in tasks.iter().zip(&outcomes) {
            assert_eq!(&outcome.task, task);
        }
        assert!(outcomes[..4].iter().all(|o| o.result.is_ok()));
        assert!(outcomes[4].result.is_err());
    }

    #[test]
    fn test_config_json() {
        let json = PipelineConfig::default().to_json();
        assert!(json.contains("\"noisefilter_intensity\": 4"));
    }
}
