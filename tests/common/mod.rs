//! Fixture photos built at test time: a JPEG from the `image` encoder with a
//! hand-assembled EXIF APP1 segment spliced in after SOI, and a bare HEIF
//! container carrying only an EXIF item.

#![allow(dead_code)]

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use std::path::Path;

pub const GPS_LATITUDE_REF: u16 = 0x0001;
pub const GPS_LATITUDE: u16 = 0x0002;
pub const GPS_LONGITUDE_REF: u16 = 0x0003;
pub const GPS_LONGITUDE: u16 = 0x0004;

const TAG_ORIENTATION: u16 = 0x0112;
const TAG_GPS_POINTER: u16 = 0x8825;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

#[derive(Debug, Clone)]
pub enum Entry {
    Ascii(u16, &'static str),
    Rationals(u16, Vec<(u32, u32)>),
    Short(u16, u16),
}

impl Entry {
    fn tag(&self) -> u16 {
        match self {
            Entry::Ascii(tag, _) | Entry::Rationals(tag, _) | Entry::Short(tag, _) => *tag,
        }
    }
}

pub fn dms(d: u32, m: u32, s: u32) -> Vec<(u32, u32)> {
    vec![(d, 1), (m, 1), (s, 1)]
}

/// 40°26′46″N 79°58′56″W
pub fn pittsburgh() -> Vec<Entry> {
    vec![
        Entry::Ascii(GPS_LATITUDE_REF, "N"),
        Entry::Rationals(GPS_LATITUDE, dms(40, 26, 46)),
        Entry::Ascii(GPS_LONGITUDE_REF, "W"),
        Entry::Rationals(GPS_LONGITUDE, dms(79, 58, 56)),
    ]
}

pub fn without(entries: Vec<Entry>, tag: u16) -> Vec<Entry> {
    entries.into_iter().filter(|e| e.tag() != tag).collect()
}

/// Little-endian TIFF: IFD0 points at a GPS IFD holding `gps`, or, when
/// `gps` is `None`, IFD0 carries only an Orientation tag.
pub fn tiff(gps: Option<Vec<Entry>>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    // IFD0: one entry, 18 bytes, GPS IFD follows at 26
    let gps_offset = 8 + 2 + 12 + 4;
    out.extend_from_slice(&1u16.to_le_bytes());
    match gps {
        Some(_) => write_entry(&mut out, TAG_GPS_POINTER, TYPE_LONG, 1, &(gps_offset as u32).to_le_bytes()),
        None => write_entry(&mut out, TAG_ORIENTATION, TYPE_SHORT, 1, &[1, 0, 0, 0]),
    }
    out.extend_from_slice(&0u32.to_le_bytes());

    let Some(mut entries) = gps else {
        return out;
    };
    entries.sort_by_key(Entry::tag);

    let mut data_offset = gps_offset + 2 + 12 * entries.len() + 4;
    let mut data = Vec::new();
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in &entries {
        match entry {
            Entry::Ascii(tag, text) => {
                let mut bytes = text.as_bytes().to_vec();
                bytes.push(0);
                let count = bytes.len() as u32;
                if bytes.len() <= 4 {
                    bytes.resize(4, 0);
                    write_entry(&mut out, *tag, TYPE_ASCII, count, &bytes);
                } else {
                    write_entry(&mut out, *tag, TYPE_ASCII, count, &(data_offset as u32).to_le_bytes());
                    data_offset += bytes.len();
                    data.extend_from_slice(&bytes);
                }
            }
            Entry::Rationals(tag, parts) => {
                write_entry(&mut out, *tag, TYPE_RATIONAL, parts.len() as u32, &(data_offset as u32).to_le_bytes());
                for (num, denom) in parts {
                    data.extend_from_slice(&num.to_le_bytes());
                    data.extend_from_slice(&denom.to_le_bytes());
                }
                data_offset += parts.len() * 8;
            }
            Entry::Short(tag, value) => {
                let mut bytes = value.to_le_bytes().to_vec();
                bytes.resize(4, 0);
                write_entry(&mut out, *tag, TYPE_SHORT, 1, &bytes);
            }
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data);
    out
}

/// Little-endian TIFF whose IFD0 holds only an Orientation tag.
pub fn oriented_tiff(orientation: u16) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    let mut value = orientation.to_le_bytes().to_vec();
    value.resize(4, 0);
    write_entry(&mut out, TAG_ORIENTATION, TYPE_SHORT, 1, &value);
    out.extend_from_slice(&0u32.to_le_bytes());
    out
}

fn write_entry(out: &mut Vec<u8>, tag: u16, kind: u16, count: u32, value: &[u8]) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&kind.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value[..4]);
}

pub fn plain_jpeg() -> Vec<u8> {
    let img = RgbImage::from_fn(64, 48, |x, y| Rgb([(x * 4) as u8, (y * 5) as u8, 128]));
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, 90)
        .encode_image(&img)
        .unwrap();
    jpeg
}

pub fn jpeg_with_exif(tiff: &[u8]) -> Vec<u8> {
    let jpeg = plain_jpeg();
    let mut out = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn boxed(kind: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = ((8 + body.len()) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(body);
    out
}

/// `ftyp` + `meta` with a single `Exif` item stored in `idat`. There is no
/// coded image, so only metadata readers can make sense of it.
pub fn heif_with_exif(tiff: &[u8]) -> Vec<u8> {
    // 4-byte offset to the TIFF header, then the header itself
    let mut payload = vec![0, 0, 0, 0];
    payload.extend_from_slice(tiff);

    let mut infe = vec![2, 0, 0, 0];
    infe.extend_from_slice(&1u16.to_be_bytes());
    infe.extend_from_slice(&0u16.to_be_bytes());
    infe.extend_from_slice(b"Exif");

    let mut iinf = vec![0, 0, 0, 0];
    iinf.extend_from_slice(&1u16.to_be_bytes());
    iinf.extend_from_slice(&boxed(b"infe", &infe));

    // version 1: 4-byte offsets and lengths, construction method 1 (idat)
    let mut iloc = vec![1, 0, 0, 0, 0x44, 0x00];
    iloc.extend_from_slice(&1u16.to_be_bytes());
    iloc.extend_from_slice(&1u16.to_be_bytes());
    iloc.extend_from_slice(&[0, 1]);
    iloc.extend_from_slice(&0u16.to_be_bytes());
    iloc.extend_from_slice(&1u16.to_be_bytes());
    iloc.extend_from_slice(&0u32.to_be_bytes());
    iloc.extend_from_slice(&(payload.len() as u32).to_be_bytes());

    let mut meta = vec![0, 0, 0, 0];
    meta.extend_from_slice(&boxed(b"iinf", &iinf));
    meta.extend_from_slice(&boxed(b"iloc", &iloc));
    meta.extend_from_slice(&boxed(b"idat", &payload));

    let mut out = boxed(b"ftyp", b"heic\0\0\0\0mif1heic");
    out.extend_from_slice(&boxed(b"meta", &meta));
    out
}

pub fn write_photo(path: &Path, gps: Option<Vec<Entry>>) {
    std::fs::write(path, jpeg_with_exif(&tiff(gps))).unwrap();
}

pub fn write_photo_without_exif(path: &Path) {
    std::fs::write(path, plain_jpeg()).unwrap();
}

pub fn write_oriented_photo(path: &Path, orientation: u16) {
    std::fs::write(path, jpeg_with_exif(&oriented_tiff(orientation))).unwrap();
}

pub fn write_heic(path: &Path, gps: Option<Vec<Entry>>) {
    std::fs::write(path, heif_with_exif(&tiff(gps))).unwrap();
}

/// Valid JPEG whose EXIF segment is not a TIFF structure.
pub fn write_photo_with_corrupt_exif(path: &Path) {
    std::fs::write(path, jpeg_with_exif(b"notatiff")).unwrap();
}
