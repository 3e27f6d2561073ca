//! Map deep links rendered as QR codes, one per provider.

use anyhow::{anyhow, Result};
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{QR_MAX_SIDE_PX, QR_MODULE_PX, QR_QUIET_ZONE};
use crate::coordinates::GeoCoordinate;
use crate::error::GeoQrError;

/// One row of the provider table.
#[derive(Debug)]
pub struct MapProvider {
    pub slug: &'static str,
    pub label: &'static str,
    /// `{lat}` and `{lon}` are replaced with decimal degrees
    pub url_template: &'static str,
}

pub const PROVIDERS: &[MapProvider] = &[
    MapProvider {
        slug: "google_maps",
        label: "Google Maps",
        url_template: "https://www.google.com/maps/search/?api=1&query={lat},{lon}",
    },
    MapProvider {
        slug: "apple_maps",
        label: "Apple Maps",
        url_template: "https://maps.apple.com/?ll={lat},{lon}&q={lat},{lon}",
    },
];

impl MapProvider {
    /// Uses the shortest round-trip formatting of `f64`, so the URL carries
    /// every significant digit and parses back to the same value.
    pub fn url_for(&self, coordinate: &GeoCoordinate) -> String {
        self.url_template
            .replace("{lat}", &coordinate.latitude.to_string())
            .replace("{lon}", &coordinate.longitude.to_string())
    }

    pub fn artifact_path(&self, output_dir: &Path, identifier: &str) -> PathBuf {
        output_dir.join(format!("{}_{}.png", identifier, self.slug))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeArtifact {
    pub provider: &'static str,
    pub label: &'static str,
    pub url: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct QrStyle {
    pub module_px: u32,
    pub quiet_zone: u32,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            module_px: QR_MODULE_PX,
            quiet_zone: QR_QUIET_ZONE,
        }
    }
}

/// Renders one QR per provider into `output_dir`, in table order.
pub fn generate(
    coordinate: &GeoCoordinate,
    identifier: &str,
    output_dir: &Path,
    style: &QrStyle,
) -> Result<Vec<CodeArtifact>, GeoQrError> {
    std::fs::create_dir_all(output_dir).map_err(|e| GeoQrError::write_failure(output_dir, e))?;

    let mut artifacts = Vec::with_capacity(PROVIDERS.len());
    for provider in PROVIDERS {
        let url = provider.url_for(coordinate);
        let bitmap = render_code(&url, style).map_err(|e| GeoQrError::CodeEncoding {
            identifier: identifier.to_string(),
            detail: format!("{:#}", e),
        })?;

        let path = provider.artifact_path(output_dir, identifier);
        bitmap
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| GeoQrError::write_failure(&path, into_io_error(e)))?;
        debug!("Wrote {} code to {}", provider.label, path.display());

        artifacts.push(CodeArtifact {
            provider: provider.slug,
            label: provider.label,
            url,
            path,
        });
    }
    Ok(artifacts)
}

/// Rasterises `payload` as a black-on-white QR symbol.
/// Fails when the symbol would be wider than [`QR_MAX_SIDE_PX`].
pub fn render_code(payload: &str, style: &QrStyle) -> Result<GrayImage> {
    let qr = QrCode::new(payload.as_bytes())?;

    let module = style.module_px.max(1);
    let width = qr.width() as u32;
    let side = style
        .quiet_zone
        .checked_mul(2)
        .and_then(|zone| zone.checked_add(width))
        .and_then(|modules| modules.checked_mul(module))
        .filter(|side| *side <= QR_MAX_SIDE_PX)
        .ok_or_else(|| {
            anyhow!(
                "{} modules of {} px plus a quiet zone of {} exceed {} px",
                width,
                module,
                style.quiet_zone,
                QR_MAX_SIDE_PX
            )
        })?;
    let mut img = GrayImage::from_pixel(side, side, Luma([255]));

    for y in 0..width {
        for x in 0..width {
            if qr[(x as usize, y as usize)] != Color::Dark {
                continue;
            }
            let px = (style.quiet_zone + x) * module;
            let py = (style.quiet_zone + y) * module;
            for dy in 0..module {
                for dx in 0..module {
                    img.put_pixel(px + dx, py + dy, Luma([0]));
                }
            }
        }
    }

    Ok(img)
}

fn into_io_error(err: image::ImageError) -> std::io::Error {
    match err {
        image::ImageError::IoError(e) => e,
        other => std::io::Error::other(other),
    }
}
