use ignore::WalkBuilder;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

use crate::coordinates::normalize;
use crate::error::GeoQrError;
use crate::exif_parser;
use crate::image_processing::check_preview_support;
use crate::location_codes::{generate, QrStyle};
use crate::record::{ImageRecord, Outcome, Stage};
use crate::report::{assemble, ReportStyle};
use crate::settings::Settings;

/// Receives one call per image outcome and one call for the run summary.
pub trait ProgressReporter {
    fn image_started(&mut self, _path: &Path) {}
    fn image_finished(&mut self, record: &ImageRecord);
    fn run_finished(&mut self, summary: &RunSummary);
}

/// Discards everything.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn image_finished(&mut self, _record: &ImageRecord) {}
    fn run_finished(&mut self, _summary: &RunSummary) {}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub scanned: usize,
    pub geolocated: usize,
    pub no_metadata: usize,
    pub incomplete_position: usize,
    pub failed: usize,
    pub artifacts_written: usize,
    pub report: Option<PathBuf>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    fn count(&mut self, record: &ImageRecord) {
        self.scanned += 1;
        match record.outcome {
            Outcome::Geolocated => self.geolocated += 1,
            Outcome::NoMetadata => self.no_metadata += 1,
            Outcome::IncompletePosition => self.incomplete_position += 1,
            Outcome::Failed { .. } | Outcome::Pending => self.failed += 1,
        }
        self.artifacts_written += record.artifacts.len();
    }
}

#[derive(Debug)]
pub struct RunOutput {
    pub records: Vec<ImageRecord>,
    pub summary: RunSummary,
}

/// Processes every accepted image in `input_dir`, then writes the report.
///
/// Per-image problems are recorded on the image's [`ImageRecord`] and the
/// loop moves on. Only a missing input directory or a report failure ends
/// the run with an error.
pub fn run(
    input_dir: &Path,
    settings: &Settings,
    reporter: &mut dyn ProgressReporter,
) -> Result<RunOutput, GeoQrError> {
    let start_time = Instant::now();
    let files = scan_images(input_dir, settings)?;
    debug!("Found {} candidate images in {}", files.len(), input_dir.display());

    let style = QrStyle {
        module_px: settings.qr_module_px,
        quiet_zone: settings.qr_quiet_zone,
    };

    let mut summary = RunSummary::default();
    let mut used = HashSet::new();
    let mut records = Vec::with_capacity(files.len());
    for path in files {
        reporter.image_started(&path);
        let identifier = unique_identifier(&path, &mut used);
        let record = process_image(&path, identifier, &settings.output_dir, &style);
        summary.count(&record);
        reporter.image_finished(&record);
        records.push(record);
    }

    let complete: Vec<ImageRecord> = records.iter().filter(|r| r.is_complete()).cloned().collect();
    if !complete.is_empty() {
        let report_path = settings.resolved_report_path(input_dir);
        let report_style = ReportStyle {
            title: project_title(input_dir),
            preview_max_px: settings.preview_max_px,
        };
        assemble(&complete, &report_path, &report_style)?;
        summary.report = Some(report_path);
    }

    if settings.write_manifest {
        let manifest_path = manifest_path(&settings.resolved_report_path(input_dir));
        write_manifest(&manifest_path, &records)?;
    }

    summary.elapsed_secs = start_time.elapsed().as_secs_f64();
    reporter.run_finished(&summary);
    Ok(RunOutput { records, summary })
}

/// Runs extract → normalize → preview check → codes for one image. Never
/// fails; problems end up in [`ImageRecord::outcome`], so whatever reaches
/// the report can be rendered.
pub fn process_image(path: &Path, identifier: String, output_dir: &Path, style: &QrStyle) -> ImageRecord {
    let mut record = ImageRecord::new(identifier, path);

    let block = match exif_parser::extract(path) {
        Ok(Some(block)) => block,
        Ok(None) => {
            record.outcome = Outcome::NoMetadata;
            return record;
        }
        Err(e) => {
            record.outcome = Outcome::Failed { stage: Stage::Extract, reason: e.to_string() };
            return record;
        }
    };

    let coordinate = normalize(&block);
    record.tags = Some(block);
    let Some(coordinate) = coordinate else {
        record.outcome = Outcome::IncompletePosition;
        return record;
    };
    record.coordinate = Some(coordinate);

    if let Err(e) = check_preview_support(path) {
        record.outcome = Outcome::Failed { stage: Stage::Preview, reason: format!("{:#}", e) };
        return record;
    }

    match generate(&coordinate, &record.identifier, output_dir, style) {
        Ok(artifacts) => {
            record.artifacts = artifacts;
            record.outcome = Outcome::Geolocated;
        }
        Err(e) => {
            record.outcome = Outcome::Failed { stage: Stage::Codes, reason: e.to_string() };
        }
    }
    record
}

/// Lists accepted image files of `input_dir` in sorted order.
/// Anything under the output directory is skipped so reruns see the same input.
pub fn scan_images(input_dir: &Path, settings: &Settings) -> Result<Vec<PathBuf>, GeoQrError> {
    if !input_dir.is_dir() {
        return Err(GeoQrError::NotFound { path: input_dir.to_path_buf() });
    }

    let output_dir = settings.output_dir.canonicalize().ok();
    let max_depth = if settings.recursive { None } else { Some(1) };

    let mut files: Vec<PathBuf> = WalkBuilder::new(input_dir)
        .max_depth(max_depth)
        .build()
        .filter_map(|entry| entry.ok())
        .filter(|e| e.file_type().map_or(false, |ft| ft.is_file()))
        .map(|e| e.into_path())
        .filter(|path| settings.accepts(path))
        .filter(|path| match (&output_dir, path.canonicalize()) {
            (Some(out), Ok(full)) => !full.starts_with(out),
            _ => true,
        })
        .collect();
    files.sort();
    Ok(files)
}

/// File stem, suffixed `_2`, `_3`, ... when an earlier file had the same stem.
fn unique_identifier(path: &Path, used: &mut HashSet<String>) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string());

    let mut candidate = stem.clone();
    let mut counter = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", stem, counter);
        counter += 1;
    }
    candidate
}

fn project_title(input_dir: &Path) -> String {
    input_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Photo locations".to_string())
}

fn manifest_path(report_path: &Path) -> PathBuf {
    report_path.with_extension("json")
}

fn write_manifest(path: &Path, records: &[ImageRecord]) -> Result<(), GeoQrError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GeoQrError::write_failure(parent, e))?;
    }
    let json = serde_json::to_vec_pretty(records)
        .map_err(|e| GeoQrError::write_failure(path, std::io::Error::other(e)))?;
    std::fs::write(path, json).map_err(|e| GeoQrError::write_failure(path, e))
}
