use anyhow::{Context, Result};

use crate::constants::PREVIEW_JPEG_QUALITY;
use crate::exif_parser::apply_exif_orientation;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::Path;

/// JPEG-encoded, upright, bounded copy of a photo for embedding in the report.
#[derive(Debug, Clone)]
pub struct Preview {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decodes the photo at `source_path`, turns it upright and shrinks it so
/// the longest edge is at most `max_px`.
pub fn create_preview(source_path: &Path, max_px: u32) -> Result<Preview> {
    let img = decode_upright(source_path)?;
    let img = scale_down(img, max_px);

    let (width, height) = img.dimensions();
    let jpeg = encode_jpeg(&img.to_rgb8())?;
    Ok(Preview { jpeg, width, height })
}

/// Whether this build can decode `path` for a preview at all.
pub fn check_preview_support(path: &Path) -> Result<()> {
    #[cfg(not(feature = "heic"))]
    if crate::exif_parser::is_heif(path) {
        anyhow::bail!(
            "HEIC/HEIF preview for {} needs the `heic` feature",
            path.display()
        );
    }
    #[cfg(feature = "heic")]
    let _ = path;
    Ok(())
}

fn decode_upright(path: &Path) -> Result<DynamicImage> {
    check_preview_support(path)?;

    // libheif applies the irot/imir transforms while decoding
    #[cfg(feature = "heic")]
    if crate::exif_parser::is_heif(path) {
        return crate::exif_parser::heic::decode_heif(path);
    }

    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open image: {:?}", path))?
        .with_guessed_format()?
        .decode()
        .with_context(|| format!("Failed to decode image: {:?}", path))?;
    Ok(apply_exif_orientation(path, img))
}

/// Only shrinks; smaller images keep their size. Aspect ratio is preserved.
fn scale_down(img: DynamicImage, max_px: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_px && height <= max_px {
        return img;
    }
    img.resize(max_px, max_px, image::imageops::FilterType::Triangle)
}

#[cfg(not(feature = "turbojpeg"))]
fn encode_jpeg(rgb: &image::RgbImage) -> Result<Vec<u8>> {
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, PREVIEW_JPEG_QUALITY)
        .encode_image(rgb)
        .context("Failed to encode preview as JPEG")?;
    Ok(jpeg)
}

#[cfg(feature = "turbojpeg")]
fn encode_jpeg(rgb: &image::RgbImage) -> Result<Vec<u8>> {
    let jpeg = turbojpeg::compress_image(rgb, PREVIEW_JPEG_QUALITY as i32, turbojpeg::Subsamp::None)
        .with_context(|| "Failed to compress image with turbojpeg")?;
    Ok(jpeg.to_vec())
}
