use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};
use std::path::Path;

/// Reads the raw EXIF directory of the primary HEIF image.
/// Returns `Ok(None)` when the file carries no `Exif` item.
pub fn read_exif_from_heif(path: &Path) -> Result<Option<exif::Exif>> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Non UTF-8 path: {}", path.display()))?;
    let ctx = HeifContext::read_from_file(path_str)
        .map_err(|e| anyhow!("Failed to read HEIF context: {}", e))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| anyhow!("Failed to get primary image handle: {}", e))?;

    for id in handle.metadata_block_ids(b"Exif") {
        let block = handle
            .metadata(id)
            .map_err(|e| anyhow!("Failed to get metadata for ID {}: {}", id, e))?;
        if let Some(tiff) = tiff_payload(&block) {
            let exif = exif::Reader::new()
                .read_raw(tiff.to_vec())
                .context("Malformed EXIF item in HEIF file")?;
            return Ok(Some(exif));
        }
    }

    Ok(None)
}

/// The HEIF `Exif` item starts with a 4-byte offset to the TIFF header,
/// sometimes followed by an `Exif\0\0` marker.
fn tiff_payload(block: &[u8]) -> Option<&[u8]> {
    let mut data = block;
    if data.len() >= 4 && !data.starts_with(b"II") && !data.starts_with(b"MM") {
        let offset = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        data = data.get(4..)?;
        if let Some(rest) = data.get(offset..) {
            data = rest;
        }
    }
    if data.starts_with(b"Exif\0\0") {
        data = &data[6..];
    }
    (data.starts_with(b"II") || data.starts_with(b"MM")).then_some(data)
}

/// Decodes the primary HEIF image to RGB. libheif applies the container's
/// rotation and mirror properties, so the result is already upright.
pub fn decode_heif(path: &Path) -> Result<DynamicImage> {
    let path_str = path
        .to_str()
        .ok_or_else(|| anyhow!("Non UTF-8 path: {}", path.display()))?;
    let lib_heif = LibHeif::new();
    let ctx = HeifContext::read_from_file(path_str)
        .map_err(|e| anyhow!("Failed to read HEIF context: {}", e))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| anyhow!("Failed to get primary image handle: {}", e))?;
    let decoded = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| anyhow!("Failed to decode HEIF image: {}", e))?;

    let planes = decoded.planes();
    let plane = planes
        .interleaved
        .ok_or_else(|| anyhow!("HEIF image has no interleaved RGB plane"))?;

    let (width, height) = (plane.width, plane.height);
    let row_len = width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in plane.data.chunks(plane.stride).take(height as usize) {
        pixels.extend_from_slice(&row[..row_len]);
    }

    let rgb = RgbImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow!("HEIF plane size does not match {}x{}", width, height))?;
    Ok(DynamicImage::ImageRgb8(rgb))
}
