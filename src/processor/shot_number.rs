//! Shot number breakdown.
//!
//! GEDI shot numbers pack `orbit * 10^13 + beam * 10^11 + minor_frame * 10^8
//! + shot_index` into one 64-bit integer, which is too large to survive as a
//! double in most ingestion tools. The components are appended as separate
//! integer columns.

use crate::constants::shot_breakdown::{
    BEAM_DIGITS, BEAM_NUMBER, MIN_SHOT_NUMBER_DIGITS, MINOR_FRAME_DIGITS, MINOR_FRAME_NUMBER,
    ORBIT_NUMBER, SHOT_INDEX_DIGITS, SHOT_NUMBER_WITHIN_BEAM,
};
use crate::error::Result;

use polars::prelude::*;
use tracing::warn;

/// Components decoded from one shot number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotNumber {
    pub orbit: i64,
    pub beam: i64,
    pub minor_frame: i64,
    pub shot_index: i64,
}

impl ShotNumber {
    /// Decode a decimal shot number; `None` when it is too short or not numeric
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.len() < MIN_SHOT_NUMBER_DIGITS || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let index_start = value.len() - SHOT_INDEX_DIGITS;
        let frame_start = index_start - MINOR_FRAME_DIGITS;
        let beam_start = frame_start - BEAM_DIGITS;

        Some(Self {
            orbit: value[..beam_start].parse().ok()?,
            beam: value[beam_start..frame_start].parse().ok()?,
            minor_frame: value[frame_start..index_start].parse().ok()?,
            shot_index: value[index_start..].parse().ok()?,
        })
    }
}

/// Append orbit, beam, minor frame and shot index columns.
///
/// Rows and existing columns are untouched; unparseable shot numbers yield
/// nulls. Skipped with a warning when the shot number column is missing.
pub fn add_shot_number_breakdown(df: &mut DataFrame, shot_number_column: &str) -> Result<()> {
    if df.get_column_index(shot_number_column).is_none() {
        warn!(
            "Column {} not present, skipping shot number breakdown",
            shot_number_column
        );
        return Ok(());
    }

    let shots = df
        .column(shot_number_column)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let decoded: Vec<Option<ShotNumber>> = shots
        .str()?
        .into_iter()
        .map(|value| value.and_then(ShotNumber::parse))
        .collect();

    let component = |name: &str, part: fn(&ShotNumber) -> i64| {
        let values: Vec<Option<i64>> = decoded.iter().map(|shot| shot.as_ref().map(part)).collect();
        Series::new(name.into(), values)
    };

    df.with_column(component(ORBIT_NUMBER, |s| s.orbit))?;
    df.with_column(component(BEAM_NUMBER, |s| s.beam))?;
    df.with_column(component(MINOR_FRAME_NUMBER, |s| s.minor_frame))?;
    df.with_column(component(SHOT_NUMBER_WITHIN_BEAM, |s| s.shot_index))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_shot_number() {
        let shot = ShotNumber::parse("19590500200012345").unwrap();
        assert_eq!(
            shot,
            ShotNumber {
                orbit: 1959,
                beam: 5,
                minor_frame: 2,
                shot_index: 12345,
            }
        );
    }

    #[test]
    fn test_parse_rejects_short_or_non_numeric() {
        assert_eq!(ShotNumber::parse("1234567890123"), None);
        assert_eq!(ShotNumber::parse("19590500200012a45"), None);
        assert_eq!(ShotNumber::parse(""), None);
    }

    #[test]
    fn test_breakdown_appends_columns() {
        let mut df = df!(
            "shot_number" => [Some("19590500200012345"), None, Some("garbage")],
            "agbd" => [1.0, 2.0, 3.0],
        )
        .unwrap();

        add_shot_number_breakdown(&mut df, "shot_number").unwrap();

        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "shot_number",
                "agbd",
                "orbit_number",
                "beam_number",
                "minor_frame_number",
                "shot_number_within_beam",
            ]
        );
        assert_eq!(df.height(), 3);

        let orbit = df.column("orbit_number").unwrap().as_materialized_series().clone();
        let orbit = orbit.i64().unwrap();
        assert_eq!(orbit.get(0), Some(1959));
        assert_eq!(orbit.get(1), None);
        assert_eq!(orbit.get(2), None);

        let index = df
            .column("shot_number_within_beam")
            .unwrap()
            .as_materialized_series()
            .clone();
        assert_eq!(index.i64().unwrap().get(0), Some(12345));
    }

    #[test]
    fn test_missing_shot_column_skipped() {
        let mut df = df!("agbd" => [1.0]).unwrap();
        add_shot_number_breakdown(&mut df, "shot_number").unwrap();
        assert_eq!(df.width(), 1);
    }
}
