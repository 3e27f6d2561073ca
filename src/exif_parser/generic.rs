use exif::{Context, In, Reader, Tag};
use std::fs;
use std::path::Path;

use super::tags::{PositionTagBlock, TagKey, TagValue};

/// Applies the EXIF orientation to a decoded image
pub fn apply_exif_orientation(source_path: &Path, img: image::DynamicImage) -> image::DynamicImage {
    let file = match fs::File::open(source_path) {
        Ok(f) => f,
        Err(_) => return img,
    };

    let mut bufreader = std::io::BufReader::new(&file);
    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(e) => e,
        Err(_) => return img,
    };

    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1);

    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate270().fliph(),
        6 => img.rotate90(),
        7 => img.rotate90().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Collects the GPS IFD of the primary image.
/// Returns `None` when the directory holds no GPS field at all.
pub fn position_block(exif: &exif::Exif) -> Option<PositionTagBlock> {
    let mut block = PositionTagBlock::new();
    for field in exif.fields() {
        if field.ifd_num != In::PRIMARY || field.tag.context() != Context::Gps {
            continue;
        }
        block.insert(TagKey::resolve(field.tag), TagValue::from_field(field));
    }

    let has_pointer = exif.get_field(Tag::GPSInfoIFDPointer, In::PRIMARY).is_some();
    if block.is_empty() && !has_pointer {
        return None;
    }
    Some(block)
}
