//! Run statistics reported by the extractor.

use std::path::PathBuf;
use std::time::Duration;

/// Statistics for one granule extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionStats {
    /// Beam groups processed, in source order
    pub beams: Vec<String>,
    /// Rows assembled across all beams, before filtering
    pub rows_read: usize,
    /// Rows removed by the geolocation filter
    pub rows_dropped: usize,
    /// Data rows written to the CSV (header excluded)
    pub rows_written: usize,
    /// Datasets declared by the schema but missing from a beam
    pub absent_columns: usize,
    /// Destination file, when writing to disk
    pub output_path: Option<PathBuf>,
    /// Output size in bytes, when writing to disk
    pub output_size: Option<u64>,
    pub processing_time: Duration,
}

impl ExtractionStats {
    pub fn beams_processed(&self) -> usize {
        self.beams.len()
    }

    /// Fraction of assembled rows that survived the filter
    pub fn retention_ratio(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            self.rows_written as f64 / self.rows_read as f64
        }
    }

    /// Output size for the summary: bytes below 1 KiB, two decimals above
    pub fn format_size(bytes: u64) -> String {
        const SCALED: [&str; 4] = ["KB", "MB", "GB", "TB"];
        if bytes < 1024 {
            return format!("{} B", bytes);
        }

        let mut size = bytes as f64 / 1024.0;
        let mut unit = SCALED[0];
        for next in &SCALED[1..] {
            if size < 1024.0 {
                break;
            }
            size /= 1024.0;
            unit = next;
        }
        format!("{:.2} {}", size, unit)
    }
}
