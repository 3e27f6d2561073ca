use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use photo_geoqr::processing::{run, ProgressReporter, RunSummary};
use photo_geoqr::record::{ImageRecord, Outcome};
use photo_geoqr::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "photo-geoqr",
    version,
    about = "Extract GPS from photo EXIF, render map QR codes, and assemble a PDF report"
)]
struct Cli {
    /// Directory containing the photos
    #[arg(value_name = "INPUT_DIR")]
    input: Option<PathBuf>,

    /// Directory for the QR code images (and the default report location)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Path of the PDF report
    #[arg(short, long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Config file (default: photo_geoqr.ini in the working directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Accepted file extensions, repeatable or comma separated
    #[arg(short, long = "ext", value_name = "EXT")]
    extensions: Vec<String>,

    /// Walk subdirectories too
    #[arg(long)]
    recursive: bool,

    /// Also write a JSON manifest of every record next to the report
    #[arg(long)]
    manifest: bool,

    /// Write the effective configuration to the config file and exit
    #[arg(long)]
    init: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Turns pipeline callbacks into log lines.
struct LogReporter;

impl ProgressReporter for LogReporter {
    fn image_started(&mut self, path: &Path) {
        info!("Processing: {}", path.display());
    }

    fn image_finished(&mut self, record: &ImageRecord) {
        let name = record.source_path.display();
        match (&record.outcome, record.coordinate) {
            (Outcome::Geolocated, Some(coordinate)) => {
                info!("📍 {}: {} ({} codes)", name, coordinate, record.artifacts.len())
            }
            (Outcome::NoMetadata, _) => info!("No GPS data available in {}", name),
            (Outcome::IncompletePosition, _) => info!("No GPS coordinates found in {}", name),
            (Outcome::Failed { stage, reason }, _) => warn!("❌ {} failed at {:?}: {}", name, stage, reason),
            (outcome, _) => warn!("{}: unexpected outcome {}", name, outcome.label()),
        }
    }

    fn run_finished(&mut self, summary: &RunSummary) {
        info!("📊 Processing summary:");
        info!("   🔍 Images scanned: {}", summary.scanned);
        info!("   🗺️  Geolocated: {}", summary.geolocated);
        info!("   ❌ Without GPS: {}", summary.no_metadata + summary.incomplete_position);
        info!("   ⚠️  Failed: {}", summary.failed);
        info!("   🔳 Codes written: {}", summary.artifacts_written);
        info!("   ⏱️  Time: {:.2} s", summary.elapsed_secs);
        match summary.report {
            Some(ref path) => info!("🎉 Report written to {}", path.display()),
            None => info!("No geolocated photos, no report written"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_target(false)
        .without_time()
        .init();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        settings.input_dir = Some(input);
    }
    if let Some(output_dir) = cli.output_dir {
        settings.output_dir = output_dir;
    }
    if let Some(report) = cli.report {
        settings.report_path = Some(report);
    }
    settings.set_extensions(&cli.extensions);
    settings.recursive |= cli.recursive;
    settings.write_manifest |= cli.manifest;

    if cli.init {
        let path = cli.config.unwrap_or_else(Settings::config_path);
        settings.save(&path)?;
        info!("✅ Configuration written to {}", path.display());
        return Ok(());
    }

    let input_dir = settings
        .input_dir
        .clone()
        .context("No input directory given (pass INPUT_DIR or set input_dir in the config file)")?;

    info!("🗺️  photo-geoqr v{} starting", env!("CARGO_PKG_VERSION"));
    run(&input_dir, &settings, &mut LogReporter)
        .with_context(|| format!("Run over {} aborted", input_dir.display()))?;
    Ok(())
}
