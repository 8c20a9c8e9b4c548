//! Configuration management and validation.
//!
//! Provides the extractor configuration with layered loading
//! (defaults, then TOML file, then CLI overrides) and validation rules.

use crate::constants::{
    BEAM_PREFIX, CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_PATH_ENV, DEFAULT_FLOAT_PRECISION,
    GRANULE_FILENAME_EXTENSION, GRANULE_FILENAME_PREFIX, LATITUDE_COLUMN, LONGITUDE_COLUMN,
    MAX_FLOAT_PRECISION, SHOT_NUMBER_COLUMN,
};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Settings controlling one granule extraction
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Top-level keys starting with this prefix are processed as beams
    pub beam_prefix: String,

    /// Required prefix of the input file name
    pub filename_prefix: String,

    /// Required extension of the input file name
    pub filename_extension: String,

    /// Rows without a value in this column are dropped
    pub latitude_column: String,

    /// Rows without a value in this column are dropped
    pub longitude_column: String,

    /// Column decomposed by the shot-number breakdown
    pub shot_number_column: String,

    /// Decimal places for floating point output
    pub float_precision: usize,

    /// Append orbit/beam/frame/index columns derived from the shot number
    pub add_shot_breakdown: bool,

    /// Show a progress bar while iterating beams
    pub show_progress: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            beam_prefix: BEAM_PREFIX.to_string(),
            filename_prefix: GRANULE_FILENAME_PREFIX.to_string(),
            filename_extension: GRANULE_FILENAME_EXTENSION.to_string(),
            latitude_column: LATITUDE_COLUMN.to_string(),
            longitude_column: LONGITUDE_COLUMN.to_string(),
            shot_number_column: SHOT_NUMBER_COLUMN.to_string(),
            float_precision: DEFAULT_FLOAT_PRECISION,
            add_shot_breakdown: true,
            show_progress: true,
        }
    }
}

impl ExtractorConfig {
    /// Default configuration file location, if a config dir exists
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse a configuration from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Load with the layered approach: explicit file, then the
    /// `GEDI_L4A_EXTRACT_CONFIG` environment variable, then the default
    /// location when present, otherwise built-in defaults
    pub fn load_layered(explicit: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);

        let config_path = match (explicit, env_path) {
            (Some(path), _) => Some(path.to_path_buf()),
            (None, Some(path)) => Some(path),
            (None, None) => Self::default_config_path().filter(|path| path.exists()),
        };

        let config = match config_path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot honour
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("beam_prefix", &self.beam_prefix),
            ("filename_prefix", &self.filename_prefix),
            ("filename_extension", &self.filename_extension),
            ("latitude_column", &self.latitude_column),
            ("longitude_column", &self.longitude_column),
            ("shot_number_column", &self.shot_number_column),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::configuration(format!("{} must not be empty", key)));
            }
        }

        if self.float_precision > MAX_FLOAT_PRECISION {
            return Err(Error::configuration(format!(
                "float_precision {} exceeds the maximum of {}",
                self.float_precision, MAX_FLOAT_PRECISION
            )));
        }

        Ok(())
    }

    /// Disable the progress bar (tests, quiet mode)
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Skip the shot-number breakdown columns
    pub fn without_shot_breakdown(mut self) -> Self {
        self.add_shot_breakdown = false;
        self
    }

    /// Set the float precision used for CSV output
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = precision;
        self
    }
}
