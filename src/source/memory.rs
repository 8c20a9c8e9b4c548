//! In-memory granule.
//!
//! Holds already materialised arrays keyed by top-level group and path.
//! Keys are returned in insertion order, which stands in for the native
//! key order of a real container.

use super::{FetchedColumn, GranuleSource};
use crate::error::{Error, Result};
use crate::schema::ColumnSpec;
use polars::prelude::Series;
use std::collections::BTreeMap;

/// Granule backed by polars series held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryGranule {
    name: String,
    groups: Vec<(String, BTreeMap<String, Series>)>,
}

impl MemoryGranule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Add an empty top-level group
    pub fn with_group(mut self, key: impl Into<String>) -> Self {
        self.ensure_group(key.into());
        self
    }

    /// Add a dataset at `<key>/<path>`, creating the group if needed
    pub fn with_column(mut self, key: &str, path: &str, values: Series) -> Self {
        self.insert(key, path, values);
        self
    }

    pub fn insert(&mut self, key: &str, path: &str, values: Series) {
        let index = self.ensure_group(key.to_string());
        self.groups[index].1.insert(path.to_string(), values);
    }

    fn ensure_group(&mut self, key: String) -> usize {
        match self.groups.iter().position(|(existing, _)| *existing == key) {
            Some(index) => index,
            None => {
                self.groups.push((key, BTreeMap::new()));
                self.groups.len() - 1
            }
        }
    }
}

impl GranuleSource for MemoryGranule {
    fn group_names(&self) -> Result<Vec<String>> {
        Ok(self.groups.iter().map(|(key, _)| key.clone()).collect())
    }

    fn fetch_column(&self, beam: &str, spec: &ColumnSpec) -> Result<FetchedColumn> {
        let (_, datasets) = self
            .groups
            .iter()
            .find(|(key, _)| key == beam)
            .ok_or_else(|| Error::source(&self.name, format!("no group named '{}'", beam)))?;

        Ok(match datasets.get(&spec.source_path) {
            Some(values) => FetchedColumn::Present(values.clone().with_name(spec.name.as_str().into())),
            None => FetchedColumn::Absent,
        })
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
