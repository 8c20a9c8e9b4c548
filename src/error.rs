//! Error handling for granule extraction.
//!
//! Provides error types with context for filename validation, schema
//! construction, source access and CSV serialization failures.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the extractor
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for GEDI L4A extraction operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Input filename does not follow the granule naming convention
    #[error("Input path is not a GEDI filename: {path}")]
    InvalidGranuleName { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to parse configuration file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Variable schema violates one of its construction contracts
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// Two schema entries flatten onto the same output column
    #[error("Duplicate output column '{column}' declared by {first} and {second}")]
    DuplicateColumn {
        column: String,
        first: String,
        second: String,
    },

    /// A beam produced a different column set than the header written
    #[error("Column set of beam {beam} does not match the CSV header: expected {expected}, found {found}")]
    ColumnMismatch {
        beam: String,
        expected: String,
        found: String,
    },

    #[error("Column '{column}' in beam {beam} has {found} rows, expected {expected}")]
    LengthMismatch {
        beam: String,
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported datatype for {path}: {dtype}")]
    UnsupportedDatatype { path: String, dtype: String },

    /// Source container could not be read
    #[error("Source error in {path}: {message}")]
    Source { path: String, message: String },

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    pub fn invalid_granule_name(path: impl Into<PathBuf>) -> Self {
        Self::InvalidGranuleName { path: path.into() }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a schema contract error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn duplicate_column(
        column: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateColumn {
            column: column.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    pub fn column_mismatch(beam: impl Into<String>, expected: &[String], found: &[String]) -> Self {
        Self::ColumnMismatch {
            beam: beam.into(),
            expected: expected.join(","),
            found: found.join(","),
        }
    }

    /// Create a source access error
    pub fn source(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for failures of the input naming precondition
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self, Self::InvalidGranuleName { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
