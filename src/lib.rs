//! # photo_geoqr
//!
//! Reads the GPS position embedded in a folder of photos, turns each position
//! into QR codes that open Google Maps and Apple Maps, and collects photo and
//! codes into a single PDF, one page per geolocated photo.
//!
//! ```no_run
//! use photo_geoqr::processing::{run, SilentReporter};
//! use photo_geoqr::settings::Settings;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), photo_geoqr::GeoQrError> {
//! let output = run(Path::new("images/stucco_repair"), &Settings::default(), &mut SilentReporter)?;
//! println!("{} photos geolocated", output.summary.geolocated);
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod coordinates;
pub mod error;
pub mod exif_parser;
pub mod image_processing;
pub mod location_codes;
pub mod processing;
pub mod record;
pub mod report;
pub mod settings;

pub use coordinates::{normalize, GeoCoordinate};
pub use error::GeoQrError;
pub use exif_parser::{extract, PositionTagBlock};
pub use location_codes::{generate, CodeArtifact, MapProvider, QrStyle, PROVIDERS};
pub use record::{ImageRecord, Outcome, Stage};
pub use report::{assemble, ReportStyle};
