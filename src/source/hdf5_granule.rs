//! HDF5 granule reader.
//!
//! Reads one-dimensional datasets from a GEDI granule by their stored
//! datatype. Signed integers become `Int64`, unsigned integers `UInt64`
//! (shot numbers need the full 64 bits), floats `Float64` and strings
//! `String` with trailing NUL padding removed.

use super::{FetchedColumn, GranuleSource};
use crate::error::{Error, Result};
use crate::schema::ColumnSpec;
use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Longest fixed-length string read from a granule
const MAX_FIXED_STRING_LEN: usize = 64;

/// Granule opened read-only from an HDF5 file
#[derive(Debug)]
pub struct Hdf5Granule {
    file: hdf5::File,
    path: PathBuf,
}

impl Hdf5Granule {
    /// Open a granule read-only; the file is closed when the value drops
    pub fn open(path: &Path) -> Result<Self> {
        let file = hdf5::File::open(path).map_err(|e| {
            Error::source(path.display().to_string(), format!("failed to open: {}", e))
        })?;
        debug!("Opened granule {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Check each segment so a missing intermediate group reads as absent
    fn path_exists(&self, full_path: &str) -> bool {
        let mut prefix = String::with_capacity(full_path.len());
        for segment in full_path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            if !self.file.link_exists(&prefix) {
                return false;
            }
        }
        true
    }

    fn read_series(&self, full_path: &str, name: &str) -> Result<Series> {
        let dataset = self.file.dataset(full_path)?;
        if dataset.ndim() != 1 {
            return Err(Error::source(
                full_path,
                format!("expected a 1-D dataset, found {} dimensions", dataset.ndim()),
            ));
        }

        let name: PlSmallStr = name.into();
        let descriptor = dataset.dtype()?.to_descriptor()?;
        let series = match descriptor {
            TypeDescriptor::Integer(_) => {
                let values = dataset.read_1d::<i64>()?;
                Series::new(name, values.to_vec())
            }
            TypeDescriptor::Unsigned(_) => {
                let values = dataset.read_1d::<u64>()?;
                Series::new(name, values.to_vec())
            }
            TypeDescriptor::Float(_) => {
                let values = dataset.read_1d::<f64>()?;
                Series::new(name, values.to_vec())
            }
            TypeDescriptor::Boolean => {
                let values = dataset.read_1d::<bool>()?;
                Series::new(name, values.to_vec())
            }
            TypeDescriptor::VarLenUnicode => {
                let values = dataset.read_1d::<VarLenUnicode>()?;
                strings(name, values.iter().map(|v| v.as_str()))
            }
            TypeDescriptor::VarLenAscii => {
                let values = dataset.read_1d::<VarLenAscii>()?;
                strings(name, values.iter().map(|v| v.as_str()))
            }
            TypeDescriptor::FixedAscii(len) if len <= MAX_FIXED_STRING_LEN => {
                let values = dataset.read_1d::<FixedAscii<MAX_FIXED_STRING_LEN>>()?;
                strings(name, values.iter().map(|v| v.as_str()))
            }
            TypeDescriptor::FixedUnicode(len) if len <= MAX_FIXED_STRING_LEN => {
                let values = dataset.read_1d::<FixedUnicode<MAX_FIXED_STRING_LEN>>()?;
                strings(name, values.iter().map(|v| v.as_str()))
            }
            other => {
                return Err(Error::UnsupportedDatatype {
                    path: full_path.to_string(),
                    dtype: format!("{:?}", other),
                });
            }
        };

        Ok(series)
    }
}

fn strings<'a>(name: PlSmallStr, values: impl Iterator<Item = &'a str>) -> Series {
    let values: Vec<&str> = values.map(|v| v.trim_end_matches('\0')).collect();
    Series::new(name, values)
}

impl GranuleSource for Hdf5Granule {
    fn group_names(&self) -> Result<Vec<String>> {
        Ok(self.file.member_names()?)
    }

    fn fetch_column(&self, beam: &str, spec: &ColumnSpec) -> Result<FetchedColumn> {
        let full_path = format!("{}/{}", beam, spec.source_path);
        if !self.path_exists(&full_path) {
            return Ok(FetchedColumn::Absent);
        }

        self.read_series(&full_path, &spec.name)
            .map(FetchedColumn::Present)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
