use serde::Serialize;
use std::path::PathBuf;

use crate::coordinates::GeoCoordinate;
use crate::exif_parser::PositionTagBlock;
use crate::location_codes::{CodeArtifact, PROVIDERS};

/// Pipeline stage at which an image failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    /// The photo cannot be embedded in the report by this build
    Preview,
    Codes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    Geolocated,
    /// No EXIF, or EXIF without a GPS directory
    NoMetadata,
    /// GPS directory present but a required field is missing
    IncompletePosition,
    Failed { stage: Stage, reason: String },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Geolocated => "geolocated",
            Outcome::NoMetadata => "no-metadata",
            Outcome::IncompletePosition => "no-position-data",
            Outcome::Failed { .. } => "failed",
        }
    }
}

/// Everything known about one input image.
///
/// `artifacts` is only filled once `coordinate` is set, and `coordinate` only
/// once a tag block with all four required fields was read.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    pub identifier: String,
    pub source_path: PathBuf,
    #[serde(skip)]
    pub tags: Option<PositionTagBlock>,
    pub coordinate: Option<GeoCoordinate>,
    pub artifacts: Vec<CodeArtifact>,
    pub outcome: Outcome,
}

impl ImageRecord {
    pub fn new(identifier: impl Into<String>, source_path: impl Into<PathBuf>) -> Self {
        Self {
            identifier: identifier.into(),
            source_path: source_path.into(),
            tags: None,
            coordinate: None,
            artifacts: Vec::new(),
            outcome: Outcome::Pending,
        }
    }

    pub fn artifact(&self, provider_slug: &str) -> Option<&CodeArtifact> {
        self.artifacts.iter().find(|a| a.provider == provider_slug)
    }

    /// True when there is an artifact for every configured provider.
    pub fn is_complete(&self) -> bool {
        self.coordinate.is_some() && PROVIDERS.iter().all(|p| self.artifact(p.slug).is_some())
    }
}
