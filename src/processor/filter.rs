//! Row validity filter.
//!
//! Downstream geospatial ingestion cannot place a footprint without both
//! coordinates, so such rows are never emitted. Runs after sentinel
//! cleaning.

use crate::error::{Error, Result};

use polars::prelude::*;
use tracing::debug;

/// Keep only rows where both coordinate columns hold a value
pub fn filter_valid_geolocation(
    df: DataFrame,
    latitude_column: &str,
    longitude_column: &str,
) -> Result<DataFrame> {
    for column in [latitude_column, longitude_column] {
        if df.get_column_index(column).is_none() {
            return Err(Error::configuration(format!(
                "geolocation column '{}' is not part of the table",
                column
            )));
        }
    }

    let before = df.height();
    let filtered = df
        .lazy()
        .filter(
            col(latitude_column)
                .is_not_null()
                .and(col(longitude_column).is_not_null()),
        )
        .collect()?;

    if filtered.height() < before {
        debug!(
            "Dropped {} of {} rows without geolocation",
            before - filtered.height(),
            before
        );
    }

    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_missing_either_coordinate_dropped() {
        let df = df!(
            "lat_lowestmode" => [Some(12.5), None, Some(13.0), None],
            "lon_lowestmode" => [Some(45.0), Some(45.0), None, None],
            "agbd" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0)],
        )
        .unwrap();

        let filtered = filter_valid_geolocation(df, "lat_lowestmode", "lon_lowestmode").unwrap();

        assert_eq!(filtered.height(), 1);
        let agbd = filtered.column("agbd").unwrap().as_materialized_series().clone();
        assert_eq!(agbd.f64().unwrap().get(0), Some(1.0));
    }

    #[test]
    fn test_presence_iff_both_coordinates_present() {
        let lat = [Some(1.0), None, Some(3.0), Some(4.0), None, Some(6.0)];
        let lon = [Some(1.0), Some(2.0), None, Some(4.0), None, Some(6.0)];
        let ids: Vec<i64> = (0..6).collect();
        let df = df!(
            "lat_lowestmode" => lat,
            "lon_lowestmode" => lon,
            "row" => ids,
        )
        .unwrap();

        let filtered = filter_valid_geolocation(df.clone(), "lat_lowestmode", "lon_lowestmode")
            .unwrap();
        let kept: Vec<i64> = filtered
            .column("row")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();

        let expected: Vec<i64> = (0..6)
            .filter(|&i| lat[i as usize].is_some() && lon[i as usize].is_some())
            .collect();
        assert_eq!(kept, expected);
        assert!(filtered.height() <= df.height());
    }

    #[test]
    fn test_missing_coordinate_column_is_error() {
        let df = df!("lat_lowestmode" => [1.0]).unwrap();
        assert!(filter_valid_geolocation(df, "lat_lowestmode", "lon_lowestmode").is_err());
    }
}
