//! Configuration file support
//!
//! Settings are read from TOML:
//!
//! ```toml
//! [filters]
//! white_threshold = 0.9
//! noisefilter_intensity = 4
//! grayfilter_size = { horizontal = 50, vertical = 50 }
//!
//! [processing]
//! threads = 4
//! pixel_format = "gray8"
//! ```
//!
//! Lookup order: an explicit path, `./scanfilter.toml`, then
//! `<config dir>/scanfilter/config.toml`. Command line options override
//! file values through [`CliOverrides`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::job::JobParameters;
use crate::pipeline::PipelineConfig;
use crate::raster::{Extent, PixelFormat};

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "scanfilter.toml";

/// Config error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Processing options not tied to a single filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Worker threads for batch runs, `None` uses all CPUs
    pub threads: Option<usize>,

    /// Pixel format of written pages, `None` keeps the input format
    pub pixel_format: Option<PixelFormat>,

    /// Replace existing output files
    pub overwrite: bool,
}

/// Contents of a config file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filters: JobParameters,
    pub processing: ProcessingConfig,
}

impl Config {
    /// Load the first config file found in the default locations, or the
    /// defaults when there is none
    pub fn load() -> Result<Self> {
        for path in Self::search_paths() {
            if path.is_file() {
                return Self::load_from_path(&path);
            }
        }
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load a specific config file
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Default config locations in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("scanfilter").join("config.toml"));
        }
        paths
    }

    /// Apply command line overrides; CLI values win
    pub fn merge_with_cli(&self, cli: &CliOverrides) -> PipelineConfig {
        let mut params = self.filters.clone();

        if let Some(value) = cli.black_threshold {
            params.black_threshold = value;
        }
        if let Some(value) = cli.white_threshold {
            params.white_threshold = value;
        }
        if let Some(value) = cli.noisefilter {
            params.noisefilter = value;
        }
        if let Some(value) = cli.noisefilter_intensity {
            params.noisefilter_intensity = value;
        }
        if let Some(value) = cli.grayfilter {
            params.grayfilter = value;
        }
        if let Some(value) = cli.grayfilter_size {
            params.grayfilter_size = value;
        }
        if let Some(value) = cli.grayfilter_step {
            params.grayfilter_step = value;
        }
        if let Some(value) = cli.grayfilter_threshold {
            params.grayfilter_threshold = value;
        }

        PipelineConfig {
            params,
            threads: cli.threads.or(self.processing.threads),
            pixel_format: cli.pixel_format.or(self.processing.pixel_format),
            overwrite: cli.overwrite.unwrap_or(self.processing.overwrite),
        }
    }
}

/// Values given explicitly on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub black_threshold: Option<f32>,
    pub white_threshold: Option<f32>,
    pub noisefilter: Option<bool>,
    pub noisefilter_intensity: Option<u64>,
    pub grayfilter: Option<bool>,
    pub grayfilter_size: Option<Extent>,
    pub grayfilter_step: Option<Extent>,
    pub grayfilter_threshold: Option<f32>,
    pub threads: Option<usize>,
    pub pixel_format: Option<PixelFormat>,
    pub overwrite: Option<bool>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.filters, JobParameters::default());
        assert!(config.processing.threads.is_none());
        assert!(!config.processing.overwrite);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[filters]
noisefilter_intensity = 7
grayfilter = false

[processing]
threads = 2
pixel_format = "mono"
"#
        )
        .unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.filters.noisefilter_intensity, 7);
        assert!(!config.filters.grayfilter);
        assert_eq!(config.filters.white_threshold, 0.9);
        assert_eq!(config.processing.threads, Some(2));
        assert_eq!(config.processing.pixel_format, Some(PixelFormat::Mono));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load_from_path(Path::new("/nonexistent/scanfilter.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[filters\nbroken").unwrap();
        let result = Config::load_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default();
        config.filters.noisefilter_intensity = 9;
        config.processing.threads = Some(8);

        let overrides = CliOverrides {
            noisefilter_intensity: Some(2),
            grayfilter: Some(false),
            grayfilter_size: Some(Extent::new(10, 20)),
            overwrite: Some(true),
            ..CliOverrides::new()
        };

        let merged = config.merge_with_cli(&overrides);
        assert_eq!(merged.params.noisefilter_intensity, 2);
        assert!(!merged.params.grayfilter);
        assert_eq!(merged.params.grayfilter_size, Extent::new(10, 20));
        assert_eq!(merged.threads, Some(8));
        assert!(merged.overwrite);
    }

    #[test]
    fn test_empty_overrides_keep_file_values() {
        let mut config = Config::default();
        config.filters.white_threshold = 0.75;
        let merged = config.merge_with_cli(&CliOverrides::new());
        assert_eq!(merged.params.white_threshold, 0.75);
        assert!(merged.pixel_format.is_none());
    }

    #[test]
    fn test_search_paths_start_local() {
        let paths = Config::search_paths();
        assert_eq!(paths[0], PathBuf::from(LOCAL_CONFIG_FILE));
    }
}
