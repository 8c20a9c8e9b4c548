//! Beam table assembly.
//!
//! Fetches every registry column for one beam and builds a single frame.
//! Columns are cast to their declared kind and NaN floats read as missing.
//! Absent columns become all-missing columns so every beam carries the
//! same column set.

use crate::error::{Error, Result};
use crate::schema::{ColumnRegistry, ColumnSpec, VariableKind};
use crate::source::{FetchedColumn, GranuleSource};

use polars::prelude::*;
use tracing::{debug, trace};

/// Columns a beam did not provide
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub absent_columns: Vec<String>,
}

/// Build the frame for `beam` from every column in `registry`
pub fn assemble_beam<S: GranuleSource + ?Sized>(
    source: &S,
    beam: &str,
    registry: &ColumnRegistry,
) -> Result<(DataFrame, AssemblyReport)> {
    let mut fetched: Vec<(&ColumnSpec, Option<Series>)> = Vec::with_capacity(registry.len());
    let mut height: Option<(usize, &str)> = None;
    let mut report = AssemblyReport::default();

    for spec in registry.columns() {
        match source.fetch_column(beam, spec)? {
            FetchedColumn::Present(series) => {
                let series = conform(series, spec)?;
                match height {
                    None => height = Some((series.len(), spec.name.as_str())),
                    Some((expected, first)) if expected != series.len() => {
                        debug!(
                            "Column {} disagrees with {} on row count in {}",
                            spec.name, first, beam
                        );
                        return Err(Error::LengthMismatch {
                            beam: beam.to_string(),
                            column: spec.name.clone(),
                            expected,
                            found: series.len(),
                        });
                    }
                    Some(_) => {}
                }
                trace!("Fetched {}/{} ({} rows)", beam, spec.source_path, series.len());
                fetched.push((spec, Some(series)));
            }
            FetchedColumn::Absent => {
                debug!("Dataset {}/{} not found, filling with nulls", beam, spec.source_path);
                report.absent_columns.push(spec.name.clone());
                fetched.push((spec, None));
            }
        }
    }

    let height = height.map(|(rows, _)| rows).unwrap_or(0);
    let columns: Vec<Column> = fetched
        .into_iter()
        .map(|(spec, series)| {
            let series = series.unwrap_or_else(|| {
                Series::full_null(spec.name.as_str().into(), height, &spec.kind.dtype())
            });
            Column::from(series)
        })
        .collect();

    Ok((DataFrame::new(columns)?, report))
}

/// Cast a fetched column to its declared kind under its output name
fn conform(series: Series, spec: &ColumnSpec) -> Result<Series> {
    let dtype = spec.kind.dtype();
    let series = if series.dtype() == &dtype {
        series
    } else {
        series.cast(&dtype)?
    };

    let name: PlSmallStr = spec.name.as_str().into();
    if spec.kind != VariableKind::Float {
        return Ok(series.with_name(name));
    }

    let cleaned: Float64Chunked = series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(cleaned.with_name(name).into_series())
}
