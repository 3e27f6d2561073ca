//! PDF report: one A4 page per geolocated photo, carrying the photo and one
//! QR code per map provider.
//!
//! The assembler trusts its caller for ordering and filtering. Pages are
//! emitted in input order and every record must already carry a complete
//! artifact set; anything else is rejected before a single byte is written.

use anyhow::{anyhow, Context};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

use crate::constants::*;
use crate::error::GeoQrError;
use crate::image_processing::{create_preview, Preview};
use crate::location_codes::PROVIDERS;
use crate::record::ImageRecord;

#[derive(Debug, Clone)]
pub struct ReportStyle {
    pub title: String,
    pub preview_max_px: u32,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            title: "Photo locations".to_string(),
            preview_max_px: PREVIEW_MAX_PX,
        }
    }
}

/// Axis-aligned box in PDF points, origin bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeSlot {
    /// Baseline origin of the provider label
    pub label: (f32, f32),
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionLayout {
    pub heading: (f32, f32),
    pub subtitle: (f32, f32),
    pub photo: Rect,
    pub codes: Vec<CodeSlot>,
}

/// Places the heading, the photo and `code_count` QR codes on one page.
///
/// The photo is fitted into the bounded region with its aspect ratio kept;
/// codes share the content width in equal columns below it.
pub fn section_layout(photo_width: u32, photo_height: u32, code_count: usize) -> SectionLayout {
    let content_width = PAGE_WIDTH - 2.0 * PAGE_MARGIN;

    let heading_y = PAGE_HEIGHT - PAGE_MARGIN - HEADING_FONT_SIZE;
    let subtitle_y = heading_y - SUBTITLE_FONT_SIZE - 8.0;
    let photo_top = subtitle_y - 14.0;

    let (width, height) = fit(photo_width, photo_height, content_width, PHOTO_REGION_HEIGHT);
    let photo = Rect {
        x: PAGE_MARGIN + (content_width - width) / 2.0,
        y: photo_top - height,
        width,
        height,
    };

    let label_y = photo_top - PHOTO_REGION_HEIGHT - 24.0;
    let code_top = label_y - 8.0;
    let column_width = content_width / code_count.max(1) as f32;
    let side = (column_width - QR_COLUMN_GAP).min(QR_MAX_SIZE);

    let codes = (0..code_count)
        .map(|i| {
            let x = PAGE_MARGIN + i as f32 * column_width + (column_width - side) / 2.0;
            CodeSlot {
                label: (x, label_y),
                rect: Rect { x, y: code_top - side, width: side, height: side },
            }
        })
        .collect();

    SectionLayout {
        heading: (PAGE_MARGIN, heading_y),
        subtitle: (PAGE_MARGIN, subtitle_y),
        photo,
        codes,
    }
}

fn fit(width: u32, height: u32, max_width: f32, max_height: f32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / width as f32).min(max_height / height as f32);
    (width as f32 * scale, height as f32 * scale)
}

struct Fonts {
    heading: ObjectId,
    body: ObjectId,
}

/// Writes the report for `records` to `output_path`, one page per record.
///
/// An empty `records` slice is rejected with [`GeoQrError::NothingToReport`]
/// rather than producing a zero-page document, so callers filter down to
/// complete records first and skip the call when none are left.
pub fn assemble(records: &[ImageRecord], output_path: &Path, style: &ReportStyle) -> Result<(), GeoQrError> {
    if records.is_empty() {
        return Err(GeoQrError::NothingToReport);
    }
    for record in records {
        for provider in PROVIDERS {
            if record.artifact(provider.slug).is_none() {
                return Err(GeoQrError::InvalidInput {
                    identifier: record.identifier.clone(),
                    provider: provider.slug.to_string(),
                });
            }
        }
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let fonts = Fonts {
        heading: doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
        }),
        body: doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        }),
    };

    let mut page_ids = Vec::with_capacity(records.len());
    for record in records {
        let page_id = add_section(&mut doc, pages_id, &fonts, record, style)
            .map_err(|e| GeoQrError::render_failure(&record.identifier, format!("{:#}", e)))?;
        debug!("Rendered report section for {}", record.identifier);
        page_ids.push(page_id);
    }

    let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_ids.len() as i64,
        "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(pdf_text(&style.title)),
        "Producer" => Object::string_literal(concat!("photo_geoqr ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(chrono::Local::now().format("D:%Y%m%d%H%M%S").to_string()),
    });
    doc.trailer.set("Info", info_id);

    doc.compress();
    write_document(&mut doc, output_path)
}

fn add_section(
    doc: &mut Document,
    pages_id: ObjectId,
    fonts: &Fonts,
    record: &ImageRecord,
    style: &ReportStyle,
) -> anyhow::Result<ObjectId> {
    let preview = create_preview(&record.source_path, style.preview_max_px)?;
    let layout = section_layout(preview.width, preview.height, PROVIDERS.len());

    let mut xobjects = Dictionary::new();
    xobjects.set("Photo", doc.add_object(jpeg_xobject(&preview)));

    for (i, provider) in PROVIDERS.iter().enumerate() {
        let artifact = record
            .artifact(provider.slug)
            .ok_or_else(|| anyhow!("missing {} artifact", provider.slug))?;
        let code = image::open(&artifact.path)
            .with_context(|| format!("Failed to read code image {}", artifact.path.display()))?
            .to_luma8();
        let id = doc.add_object(gray_xobject(code));
        xobjects.set(format!("Code{}", i), id);
    }

    let content = Content {
        operations: section_operations(record, &layout),
    };
    let encoded = content
        .encode()
        .map_err(|e| anyhow!("Failed to encode page content: {}", e))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => fonts.heading,
            "F2" => fonts.body,
        },
        "XObject" => xobjects,
    };

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
    }))
}

/// Drawing operations of one page. XObject names match [`add_section`].
fn section_operations(record: &ImageRecord, layout: &SectionLayout) -> Vec<Operation> {
    let mut ops = Vec::new();
    text(&mut ops, "F1", HEADING_FONT_SIZE, layout.heading, &record.identifier);
    if let Some(coordinate) = record.coordinate {
        text(&mut ops, "F2", SUBTITLE_FONT_SIZE, layout.subtitle, &coordinate.to_string());
    }
    image_at(&mut ops, "Photo", layout.photo);

    for (i, (provider, slot)) in PROVIDERS.iter().zip(&layout.codes).enumerate() {
        let label = record
            .artifact(provider.slug)
            .map(|a| a.label)
            .unwrap_or(provider.label);
        text(&mut ops, "F2", LABEL_FONT_SIZE, slot.label, label);
        image_at(&mut ops, &format!("Code{}", i), slot.rect);
    }
    ops
}

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, (x, y): (f32, f32), value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![name(font), real(size)]));
    ops.push(Operation::new("Td", vec![real(x), real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(pdf_text(value))]));
    ops.push(Operation::new("ET", vec![]));
}

fn image_at(ops: &mut Vec<Operation>, xobject: &str, rect: Rect) {
    ops.push(Operation::new("q", vec![]));
    ops.push(Operation::new(
        "cm",
        vec![real(rect.width), real(0.0), real(0.0), real(rect.height), real(rect.x), real(rect.y)],
    ));
    ops.push(Operation::new("Do", vec![name(xobject)]));
    ops.push(Operation::new("Q", vec![]));
}

fn jpeg_xobject(preview: &Preview) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => preview.width as i64,
            "Height" => preview.height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        preview.jpeg.clone(),
    )
    .with_compression(false)
}

fn gray_xobject(code: image::GrayImage) -> Stream {
    let (width, height) = code.dimensions();
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Interpolate" => false,
        },
        code.into_raw(),
    )
}

fn write_document(doc: &mut Document, output_path: &Path) -> Result<(), GeoQrError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| GeoQrError::write_failure(parent, e))?;
    }
    let file = File::create(output_path).map_err(|e| GeoQrError::write_failure(output_path, e))?;
    let mut writer = BufWriter::new(file);
    doc.save_to(&mut writer)
        .map_err(|e| GeoQrError::write_failure(output_path, std::io::Error::other(e.to_string())))?;
    writer
        .flush()
        .map_err(|e| GeoQrError::write_failure(output_path, e))
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Standard Type1 fonts only cover Latin-1; anything else becomes '?'.
fn pdf_text(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
        .collect()
}
