//! Command-line interface for `gedi-l4a-extract`.

use crate::config::ExtractorConfig;
use crate::models::ExtractionStats;
use crate::processor::GranuleProcessor;

use anyhow::Context;
use clap::Parser;
use colored::*;
use indicatif::HumanDuration;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "gedi-l4a-extract")]
#[command(about = "Extract GEDI L4A footprint biomass granules to CSV")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// GEDI L4A granule (HDF5), e.g. GEDI04_A_2019108002011_O01959_01_T03909_02_002_02_V002.h5
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination CSV file, truncated if it exists
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors. Overrides verbose settings.
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Hide the per-beam progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Do not append orbit/beam/frame/index columns
    #[arg(long)]
    pub no_shot_breakdown: bool,

    /// Decimal places for floating point columns
    #[arg(long, value_name = "DIGITS")]
    pub float_precision: Option<usize>,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.no_progress
    }

    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_overrides(&self, mut config: ExtractorConfig) -> ExtractorConfig {
        if !self.show_progress() {
            config = config.without_progress();
        }
        if self.no_shot_breakdown {
            config = config.without_shot_breakdown();
        }
        if let Some(precision) = self.float_precision {
            config = config.with_float_precision(precision);
        }
        config
    }
}

/// Run one extraction from parsed arguments
pub fn run(args: Args) -> anyhow::Result<ExtractionStats> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let config = ExtractorConfig::load_layered(args.config_file.as_deref())
        .context("Failed to load configuration")?;
    let config = args.apply_overrides(config);
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    let processor = GranuleProcessor::gedi_l4a(config)?;
    let stats = processor
        .extract_granule(&args.input, &args.output)
        .with_context(|| format!("Failed to extract {}", args.input.display()))?;

    if !args.quiet {
        print_summary(&stats);
    }
    Ok(stats)
}

fn setup_logging(args: &Args) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gedi_l4a_extractor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    }

    info!("Logging initialized at level: {}", log_level);
    Ok(())
}

fn print_summary(stats: &ExtractionStats) {
    println!("\n{}", "Extraction complete".bright_green().bold());
    println!(
        "  {} {}",
        "Beams processed:".bright_cyan(),
        stats.beams_processed().to_string().bright_white().bold()
    );
    println!("  {} {}", "Rows read:".bright_cyan(), stats.rows_read);
    println!(
        "  {} {} ({:.1}% kept)",
        "Rows written:".bright_cyan(),
        stats.rows_written.to_string().bright_white().bold(),
        stats.retention_ratio() * 100.0
    );
    if stats.rows_dropped > 0 {
        println!(
            "  {} {}",
            "Dropped without geolocation:".bright_yellow(),
            stats.rows_dropped
        );
    }
    if let Some(path) = &stats.output_path {
        let size = stats
            .output_size
            .map(ExtractionStats::format_size)
            .unwrap_or_else(|| "unknown size".to_string());
        println!("  {} {} ({})", "Output:".bright_cyan(), path.display(), size);
    }
    println!(
        "  {} {}",
        "Processing time:".bright_cyan(),
        HumanDuration(stats.processing_time)
    );
}
