//! Error types for the photo_geoqr library.
//!
//! [`GeoQrError`] covers every failure a pipeline stage can report. Whether a
//! failure is fatal depends on where it happens:
//!
//! * inside the per-image stages (extract, codes) it is caught by
//!   [`crate::processing`] and stored on the [`crate::record::ImageRecord`]
//!   as [`crate::record::Outcome::Failed`], and the run continues;
//! * a missing input directory or any report-level failure aborts the run.
//!
//! Photos without location data are not errors at all. They surface as
//! [`crate::record::Outcome::NoMetadata`] or
//! [`crate::record::Outcome::IncompletePosition`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoQrError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Path does not resolve to a readable file or directory.
    #[error("Not found: '{path}'")]
    NotFound { path: PathBuf },

    /// The file exists but its metadata could not be decoded.
    #[error("Could not decode metadata of '{path}': {detail}")]
    Decode { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// An artifact, directory or the report could not be written.
    #[error("Failed to write '{path}': {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The QR engine rejected the payload.
    #[error("Could not encode location code for '{identifier}': {detail}")]
    CodeEncoding { identifier: String, detail: String },

    // ── Report errors ─────────────────────────────────────────────────────
    /// A record handed to the assembler lacks a provider's artifact.
    #[error("Record '{identifier}' has no '{provider}' code artifact")]
    InvalidInput { identifier: String, provider: String },

    /// The assembler was given no records.
    #[error("No geolocated records to put in the report")]
    NothingToReport,

    /// A report section could not be rendered.
    #[error("Failed to render report section '{identifier}': {detail}")]
    RenderFailure { identifier: String, detail: String },
}

impl GeoQrError {
    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GeoQrError::WriteFailure {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render_failure(identifier: &str, err: impl std::fmt::Display) -> Self {
        GeoQrError::RenderFailure {
            identifier: identifier.to_string(),
            detail: err.to_string(),
        }
    }
}
