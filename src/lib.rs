//! GEDI L4A granule extractor
//!
//! Converts GEDI Level 4A footprint biomass granules (HDF5) into flat CSV
//! tables suitable for geospatial ingestion.
//!
//! This library provides tools for:
//! - Declaring the extracted variables as an explicit schema with per-column fill sentinels
//! - Assembling one table per beam from a granule source
//! - Replacing fill sentinels with missing values
//! - Dropping footprints without geolocation
//! - Decomposing shot numbers into orbit, beam, minor frame and shot index
//! - Streaming all beams into a single CSV with one header

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod granule;
pub mod models;
pub mod processor;
pub mod schema;
pub mod source;

// Re-export commonly used types
pub use config::ExtractorConfig;
pub use error::{Error, Result};
pub use granule::{GranuleName, validate_granule_name};
pub use models::ExtractionStats;
pub use processor::{CsvSink, GranuleProcessor, extract_granule};
pub use schema::{ColumnRegistry, ColumnSpec, ExtractionSchema, FillValue, VariableKind, VariableSet};
#[cfg(feature = "hdf5")]
pub use source::Hdf5Granule;
pub use source::{FetchedColumn, GranuleSource, MemoryGranule};
