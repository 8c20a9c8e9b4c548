//! Granule sources.
//!
//! A [`GranuleSource`] exposes the top-level keys of a granule and fetches
//! one column at a time from inside a beam. A path that does not exist is a
//! typed [`FetchedColumn::Absent`] outcome rather than an error, so sparse
//! granules still produce a table.

#[cfg(feature = "hdf5")]
pub mod hdf5_granule;
pub mod memory;

use crate::error::Result;
use crate::schema::ColumnSpec;
use polars::prelude::Series;

#[cfg(feature = "hdf5")]
pub use hdf5_granule::Hdf5Granule;
pub use memory::MemoryGranule;

/// Outcome of fetching one column from a beam
#[derive(Debug, Clone)]
pub enum FetchedColumn {
    /// Values in the source's native dtype, named after the output column
    Present(Series),
    /// The path does not exist in this beam
    Absent,
}

impl FetchedColumn {
    pub fn is_absent(&self) -> bool {
        matches!(self, FetchedColumn::Absent)
    }
}

/// Read access to one granule
pub trait GranuleSource {
    /// Top-level keys in the container's native order
    fn group_names(&self) -> Result<Vec<String>>;

    /// Fetch the column described by `spec` from `<beam>/<spec.source_path>`
    fn fetch_column(&self, beam: &str, spec: &ColumnSpec) -> Result<FetchedColumn>;

    /// Name used in log messages
    fn describe(&self) -> String {
        "granule".to_string()
    }
}
