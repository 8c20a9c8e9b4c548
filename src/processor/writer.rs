//! Incremental CSV writing.
//!
//! One growing CSV per granule: the header is written with the first frame
//! only, and every later frame must carry the same columns in the same
//! order because it is appended without a header.

use crate::constants::CSV_LINE_TERMINATOR;
use crate::error::{Error, Result};

use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Header state of the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkState {
    /// No header written yet
    NotStarted,
    /// Header written, rows are appended
    Writing,
}

/// CSV destination fed one beam frame at a time
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    state: SinkState,
    header: Vec<String>,
    float_precision: usize,
    rows_written: usize,
}

impl CsvSink<BufWriter<File>> {
    /// Create (truncate) the destination file
    pub fn create(path: &Path, float_precision: usize) -> Result<Self> {
        let file = File::create(path).map_err(|e| {
            Error::io(format!("Failed to create output file {}", path.display()), e)
        })?;
        debug!("Created output file {}", path.display());
        Ok(Self::new(BufWriter::new(file), float_precision))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W, float_precision: usize) -> Self {
        Self {
            writer,
            state: SinkState::NotStarted,
            header: Vec::new(),
            float_precision,
            rows_written: 0,
        }
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Column names of the header, empty before the first frame
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Append one frame; `label` names the frame in errors
    pub fn append(&mut self, df: &mut DataFrame, label: &str) -> Result<usize> {
        let columns: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();

        let include_header = match self.state {
            SinkState::NotStarted => {
                self.header = columns;
                true
            }
            SinkState::Writing => {
                if columns != self.header {
                    return Err(Error::column_mismatch(label, &self.header, &columns));
                }
                false
            }
        };

        CsvWriter::new(&mut self.writer)
            .include_header(include_header)
            .with_float_precision(Some(self.float_precision))
            .with_line_terminator(CSV_LINE_TERMINATOR.into())
            .finish(df)?;

        self.state = SinkState::Writing;
        self.rows_written += df.height();
        debug!("Appended {} rows from {}", df.height(), label);
        Ok(df.height())
    }

    /// Flush buffered output and hand back the writer
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| Error::io("Failed to flush CSV output", e))?;
        Ok(self.writer)
    }
}
