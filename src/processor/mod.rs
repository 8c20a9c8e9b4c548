//! Granule extraction pipeline.
//!
//! Each beam of a granule runs through assemble, clean, filter and augment
//! before being appended to one CSV. Only one beam's frame is held in memory
//! at a time.

pub mod assembler;
pub mod cleaning;
pub mod filter;
pub mod shot_number;
pub mod writer;

#[cfg(test)]
pub mod tests;

pub use self::assembler::{AssemblyReport, assemble_beam};
pub use self::cleaning::clean_sentinels;
pub use self::filter::filter_valid_geolocation;
pub use self::shot_number::{ShotNumber, add_shot_number_breakdown};
pub use self::writer::{CsvSink, SinkState};

use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use crate::granule::{GranuleName, validate_granule_name};
use crate::models::ExtractionStats;
use crate::schema::{ColumnRegistry, ExtractionSchema};
use crate::source::GranuleSource;

use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::DataFrame;
use std::io::Write;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// One beam after the full per-beam pipeline
#[derive(Debug, Clone)]
pub struct BeamFrame {
    pub frame: DataFrame,
    /// Rows assembled before the geolocation filter
    pub rows_read: usize,
    pub absent_columns: Vec<String>,
}

impl BeamFrame {
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.frame.height()
    }
}

/// Extracts granules into CSV using a fixed schema and configuration
#[derive(Debug, Clone)]
pub struct GranuleProcessor {
    config: ExtractorConfig,
    registry: ColumnRegistry,
}

impl GranuleProcessor {
    /// Build the column registry once and check the configured coordinate
    /// columns are part of it
    pub fn new(config: ExtractorConfig, schema: &ExtractionSchema) -> Result<Self> {
        config.validate()?;
        let registry = ColumnRegistry::build(schema)?;

        for column in [&config.latitude_column, &config.longitude_column] {
            if !registry.contains(column) {
                return Err(Error::configuration(format!(
                    "geolocation column '{}' is not declared by the schema",
                    column
                )));
            }
        }

        if config.add_shot_breakdown && !registry.contains(&config.shot_number_column) {
            warn!(
                "Shot number column '{}' is not declared by the schema, breakdown will be skipped",
                config.shot_number_column
            );
        }

        debug!("Column registry holds {} columns", registry.len());
        Ok(Self { config, registry })
    }

    /// Processor for the GEDI L4A product schema
    pub fn gedi_l4a(config: ExtractorConfig) -> Result<Self> {
        Self::new(config, &ExtractionSchema::gedi_l4a()?)
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    /// Top-level keys treated as beams, in the source's order
    pub fn beam_names<S: GranuleSource + ?Sized>(&self, source: &S) -> Result<Vec<String>> {
        let names = source.group_names()?;
        let (beams, skipped): (Vec<String>, Vec<String>) = names
            .into_iter()
            .partition(|name| name.starts_with(&self.config.beam_prefix));

        if !skipped.is_empty() {
            debug!("Skipping non-beam groups: {:?}", skipped);
        }
        Ok(beams)
    }

    /// Assemble, clean, filter and augment one beam
    pub fn process_beam<S: GranuleSource + ?Sized>(
        &self,
        source: &S,
        beam: &str,
    ) -> Result<BeamFrame> {
        let (frame, report) = assemble_beam(source, beam, &self.registry)?;
        let rows_read = frame.height();

        let frame = clean_sentinels(frame, &self.registry)?;
        let mut frame = filter_valid_geolocation(
            frame,
            &self.config.latitude_column,
            &self.config.longitude_column,
        )?;

        if self.config.add_shot_breakdown {
            add_shot_number_breakdown(&mut frame, &self.config.shot_number_column)?;
        }

        Ok(BeamFrame {
            frame,
            rows_read,
            absent_columns: report.absent_columns,
        })
    }

    /// Run every beam of `source` through the pipeline into `sink`
    pub fn process_source<S, W>(&self, source: &S, sink: &mut CsvSink<W>) -> Result<ExtractionStats>
    where
        S: GranuleSource + ?Sized,
        W: Write,
    {
        let start_time = Instant::now();
        let beams = self.beam_names(source)?;

        if beams.is_empty() {
            warn!(
                "No groups starting with '{}' found in {}",
                self.config.beam_prefix,
                source.describe()
            );
        }

        let progress = self.progress_bar(beams.len());
        let mut stats = ExtractionStats::default();

        for beam in beams {
            progress.set_message(beam.clone());
            info!("Processing {}", beam);

            let mut output = self.process_beam(source, &beam)?;
            let written = sink.append(&mut output.frame, &beam)?;

            debug!(
                "{}: {} rows read, {} dropped, {} written",
                beam,
                output.rows_read,
                output.rows_dropped(),
                written
            );

            stats.rows_read += output.rows_read;
            stats.rows_dropped += output.rows_dropped();
            stats.rows_written += written;
            stats.absent_columns += output.absent_columns.len();
            stats.beams.push(beam);
            progress.inc(1);
        }

        progress.finish_and_clear();
        stats.processing_time = start_time.elapsed();
        Ok(stats)
    }

    /// Process `source` into a CSV file at `output`, truncating it
    pub fn write_granule<S: GranuleSource + ?Sized>(
        &self,
        source: &S,
        output: &Path,
    ) -> Result<ExtractionStats> {
        let start_time = Instant::now();
        let mut sink = CsvSink::create(output, self.config.float_precision)?;
        let mut stats = self.process_source(source, &mut sink)?;
        sink.finish()?;

        stats.output_size = std::fs::metadata(output).ok().map(|meta| meta.len());
        stats.output_path = Some(output.to_path_buf());
        stats.processing_time = start_time.elapsed();

        info!(
            "Wrote {} rows from {} beams to {}",
            stats.rows_written,
            stats.beams_processed(),
            output.display()
        );
        Ok(stats)
    }

    /// Extract the granule at `input` into the CSV at `output`.
    ///
    /// The filename guard runs first; when it fails nothing is opened and
    /// the destination is left untouched.
    pub fn extract_granule(&self, input: &Path, output: &Path) -> Result<ExtractionStats> {
        if let Err(e) = validate_granule_name(input, &self.config) {
            error!(
                "{} does not look like a granule (expected {}*{})",
                input.display(),
                self.config.filename_prefix,
                self.config.filename_extension
            );
            return Err(e);
        }

        match GranuleName::parse(input) {
            Some(name) => info!("Extracting {}", name),
            None => info!("Extracting {}", input.display()),
        }

        let source = open_granule(input)?;
        self.write_granule(source.as_ref(), output)
    }

    fn progress_bar(&self, beams: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(beams as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb
    }
}

#[cfg(feature = "hdf5")]
fn open_granule(path: &Path) -> Result<Box<dyn GranuleSource>> {
    Ok(Box::new(crate::source::Hdf5Granule::open(path)?))
}

#[cfg(not(feature = "hdf5"))]
fn open_granule(path: &Path) -> Result<Box<dyn GranuleSource>> {
    Err(Error::configuration(format!(
        "cannot read {}: built without HDF5 support, rebuild with the `hdf5` feature",
        path.display()
    )))
}

/// Extract one granule with the GEDI L4A product schema
pub fn extract_granule(
    input: &Path,
    output: &Path,
    config: ExtractorConfig,
) -> Result<ExtractionStats> {
    GranuleProcessor::gedi_l4a(config)?.extract_granule(input, output)
}
