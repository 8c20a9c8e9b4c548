//! Integration tests for granule extraction
//!
//! Drives the public API end to end with an in-memory granule shaped like a
//! real GEDI L4A beam, writing to a temporary CSV.

use gedi_l4a_extractor::{
    CsvSink, Error, ExtractionSchema, ExtractorConfig, GranuleProcessor, GranuleSource,
    MemoryGranule, extract_granule,
};
use polars::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Two coverage beams and one full-power beam, plus a non-beam group
fn create_granule() -> MemoryGranule {
    let mut granule = MemoryGranule::new("GEDI04_A_2019108002011_O01959_01_T03909_02_002_02_V002.h5")
        .with_group("ANCILLARY");

    let beams: [(&str, i32, Vec<Option<f64>>); 3] = [
        ("BEAM0000", 0, vec![Some(-12.25), Some(-12.26), None]),
        ("BEAM0001", 1, vec![Some(-12.30)]),
        ("BEAM0101", 5, vec![Some(-9999.0), Some(-12.40)]),
    ];

    for (key, beam, lats) in beams {
        let rows = lats.len();
        let shots: Vec<u64> = (0..rows as u64)
            .map(|i| 19_590_000_000_000_000 + (beam as u64) * 100_000_000_000 + 100_000_000 + i)
            .collect();
        let agbd: Vec<f64> = (0..rows).map(|i| if i == 0 { -9999.0 } else { 42.0 }).collect();

        granule.insert(key, "beam", Series::new("beam".into(), vec![beam; rows]));
        granule.insert(key, "lat_lowestmode", Series::new("lat_lowestmode".into(), lats));
        granule.insert(
            key,
            "lon_lowestmode",
            Series::new("lon_lowestmode".into(), vec![-55.5; rows]),
        );
        granule.insert(key, "shot_number", Series::new("shot_number".into(), shots));
        granule.insert(key, "agbd", Series::new("agbd".into(), agbd));
        granule.insert(
            key,
            "land_cover_data/pft_class",
            Series::new("pft_class".into(), vec![2i32; rows]),
        );
    }

    granule
}

fn processor(config: ExtractorConfig) -> GranuleProcessor {
    GranuleProcessor::new(
        config.without_progress(),
        &ExtractionSchema::gedi_l4a().unwrap(),
    )
    .unwrap()
}

#[test]
fn test_granule_to_csv_file() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("granule.csv");
    let granule = create_granule();

    let stats = processor(ExtractorConfig::default())
        .write_granule(&granule, &output)
        .unwrap();

    assert_eq!(stats.beams, vec!["BEAM0000", "BEAM0001", "BEAM0101"]);
    assert_eq!(stats.rows_read, 6);
    // Only the null latitude is dropped; -9999 is not a coordinate sentinel
    assert_eq!(stats.rows_dropped, 1);
    assert_eq!(stats.rows_written, 5);

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1 + 5);
    assert_eq!(
        lines.iter().filter(|line| line.starts_with("agbd,")).count(),
        1,
        "header must appear exactly once"
    );
    assert!(content.ends_with('\n'));
    assert!(!content.contains('\r'));

    let header: Vec<&str> = lines[0].split(',').collect();
    assert_eq!(header.len(), 176);
    let agbd = header.iter().position(|h| *h == "agbd").unwrap();
    let beam_number = header.iter().position(|h| *h == "beam_number").unwrap();

    let first: Vec<&str> = lines[1].split(',').collect();
    assert_eq!(first[agbd], "");
    assert_eq!(first[beam_number], "0");

    let last: Vec<&str> = lines[5].split(',').collect();
    assert_eq!(last[agbd], "42.000000");
    assert_eq!(last[beam_number], "5");
}

#[test]
fn test_column_set_is_stable_across_beams() {
    let granule = create_granule();
    let processor = processor(ExtractorConfig::default());

    let widths: Vec<usize> = processor
        .beam_names(&granule)
        .unwrap()
        .iter()
        .map(|beam| processor.process_beam(&granule, beam).unwrap().frame.width())
        .collect();

    assert_eq!(widths, vec![176, 176, 176]);
}

#[test]
fn test_sink_reports_rows_written() {
    let granule = create_granule();
    let processor = processor(ExtractorConfig::default().with_float_precision(3));

    let mut sink = CsvSink::new(Vec::new(), processor.config().float_precision);
    let stats = processor.process_source(&granule, &mut sink).unwrap();
    assert_eq!(sink.rows_written(), stats.rows_written);

    let csv = String::from_utf8(sink.finish().unwrap()).unwrap();
    assert!(csv.contains("-55.500"));
    assert!(!csv.contains("-55.500000"));
}

#[test]
fn test_source_describes_itself() {
    let granule = create_granule();
    assert!(granule.describe().starts_with("GEDI04_A"));
    assert_eq!(granule.group_names().unwrap()[0], "ANCILLARY");
}

#[test]
fn test_guard_rejects_foreign_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("ATL08_20190108.h5");
    let output = temp_dir.path().join("atl08.csv");

    let result = extract_granule(&input, &output, ExtractorConfig::default().without_progress());

    assert!(matches!(result, Err(Error::InvalidGranuleName { .. })));
    assert!(!output.exists());
}
