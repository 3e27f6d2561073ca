//! Metadata extraction: image path in, GPS tag block (or nothing) out.

pub mod generic;
#[cfg(feature = "heic")]
pub mod heic;
pub mod tags;

pub use generic::{apply_exif_orientation, position_block};
pub use tags::{PositionTagBlock, Rational, TagKey, TagValue};

use crate::error::GeoQrError;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Reads the positioning tag block of the image at `path`.
///
/// `Ok(None)` means the image simply carries no GPS data (no EXIF, or EXIF
/// without a GPS directory). A tag block that exists but lacks fields is
/// still returned; deciding whether it is usable is up to
/// [`crate::coordinates::normalize`].
pub fn extract(path: &Path) -> Result<Option<PositionTagBlock>, GeoQrError> {
    if !path.is_file() {
        return Err(GeoQrError::NotFound { path: path.to_path_buf() });
    }

    #[cfg(feature = "heic")]
    if is_heif(path) {
        match heic::read_exif_from_heif(path) {
            Ok(Some(exif)) => return Ok(position_block(&exif)),
            Ok(None) => return Ok(None),
            Err(e) => debug!("libheif could not read {}: {:#}, trying container reader", path.display(), e),
        }
    }

    read_container(path)
}

fn read_container(path: &Path) -> Result<Option<PositionTagBlock>, GeoQrError> {
    let file = File::open(path).map_err(|_| GeoQrError::NotFound { path: path.to_path_buf() })?;
    let mut buf_reader = BufReader::new(file);
    let mut exif_reader = exif::Reader::new();
    exif_reader.continue_on_error(true);

    match exif_reader.read_from_container(&mut buf_reader) {
        Ok(exif) => Ok(position_block(&exif)),
        Err(exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            debug!("{}: {} EXIF entries skipped as malformed", path.display(), errors.len());
            Ok(position_block(&exif))
        }
        Err(exif::Error::NotFound(_)) | Err(exif::Error::BlankValue(_)) => Ok(None),
        Err(e) => Err(GeoQrError::Decode {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

pub fn is_heif(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "heic" | "heif"))
        .unwrap_or(false)
}
