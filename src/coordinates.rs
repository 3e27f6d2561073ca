//! DMS + hemisphere to signed decimal degrees.
//!
//! No range validation happens here: a malformed tag such as 95°N comes out
//! as 95.0 and is passed on unchanged.

use serde::Serialize;
use std::fmt;

use crate::exif_parser::tags::{LATITUDE, LATITUDE_REF, LONGITUDE, LONGITUDE_REF};
use crate::exif_parser::{PositionTagBlock, Rational, TagValue};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Converts a tag block to decimal degrees.
///
/// All four of `Latitude`, `LatitudeRef`, `Longitude` and `LongitudeRef` must
/// be present and non-empty, otherwise the result is `None`. Partial data
/// never yields a coordinate.
pub fn normalize(block: &PositionTagBlock) -> Option<GeoCoordinate> {
    let (Some(lat), Some(lat_ref), Some(lon), Some(lon_ref)) = (
        dms_triple(block.get(LATITUDE)),
        hemisphere(block.get(LATITUDE_REF)),
        dms_triple(block.get(LONGITUDE)),
        hemisphere(block.get(LONGITUDE_REF)),
    ) else {
        return None;
    };

    Some(GeoCoordinate {
        latitude: to_decimal(lat, lat_ref),
        longitude: to_decimal(lon, lon_ref),
    })
}

/// `degrees + minutes/60 + seconds/3600`, negated for the S and W hemispheres.
pub fn to_decimal(dms: [f64; 3], hemisphere: char) -> f64 {
    let [degrees, minutes, seconds] = dms;
    let decimal = degrees + minutes / 60.0 + seconds / 3600.0;
    match hemisphere.to_ascii_uppercase() {
        'S' | 'W' => -decimal,
        _ => decimal,
    }
}

fn dms_triple(value: Option<&TagValue>) -> Option<[f64; 3]> {
    match value? {
        TagValue::Rationals(parts) => match parts.as_slice() {
            [d, m, s] => Some([d.to_f64(), m.to_f64(), s.to_f64()]),
            _ => None,
        },
        _ => None,
    }
}

fn hemisphere(value: Option<&TagValue>) -> Option<char> {
    match value? {
        TagValue::Text(text) => text.chars().next(),
        _ => None,
    }
}

/// Builds a DMS value from whole numbers, handy for fixtures and callers
/// that already hold integral degrees/minutes/seconds.
pub fn dms(degrees: u32, minutes: u32, seconds: u32) -> TagValue {
    TagValue::Rationals(vec![
        Rational::new(degrees, 1),
        Rational::new(minutes, 1),
        Rational::new(seconds, 1),
    ])
}
