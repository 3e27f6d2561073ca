use exif::{Field, Tag, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const LATITUDE: &str = "Latitude";
pub const LATITUDE_REF: &str = "LatitudeRef";
pub const LONGITUDE: &str = "Longitude";
pub const LONGITUDE_REF: &str = "LongitudeRef";

// GPS IFD tag -> stable name
const GPS_TAG_NAMES: &[(Tag, &str)] = &[
    (Tag::GPSVersionID, "VersionID"),
    (Tag::GPSLatitudeRef, LATITUDE_REF),
    (Tag::GPSLatitude, LATITUDE),
    (Tag::GPSLongitudeRef, LONGITUDE_REF),
    (Tag::GPSLongitude, LONGITUDE),
    (Tag::GPSAltitudeRef, "AltitudeRef"),
    (Tag::GPSAltitude, "Altitude"),
    (Tag::GPSTimeStamp, "TimeStamp"),
    (Tag::GPSSatellites, "Satellites"),
    (Tag::GPSStatus, "Status"),
    (Tag::GPSMeasureMode, "MeasureMode"),
    (Tag::GPSDOP, "DOP"),
    (Tag::GPSSpeedRef, "SpeedRef"),
    (Tag::GPSSpeed, "Speed"),
    (Tag::GPSTrackRef, "TrackRef"),
    (Tag::GPSTrack, "Track"),
    (Tag::GPSImgDirectionRef, "ImgDirectionRef"),
    (Tag::GPSImgDirection, "ImgDirection"),
    (Tag::GPSMapDatum, "MapDatum"),
    (Tag::GPSDateStamp, "DateStamp"),
    (Tag::GPSDifferential, "Differential"),
];

/// Key of a [`PositionTagBlock`] entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TagKey {
    Named(&'static str),
    /// Tag number not in the vocabulary, kept so the block stays inspectable
    Raw(u16),
}

impl TagKey {
    pub fn resolve(tag: Tag) -> Self {
        GPS_TAG_NAMES
            .iter()
            .find(|(known, _)| *known == tag)
            .map(|(_, name)| TagKey::Named(name))
            .unwrap_or(TagKey::Raw(tag.number()))
    }
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagKey::Named(name) => f.write_str(name),
            TagKey::Raw(number) => write!(f, "0x{:04x}", number),
        }
    }
}

/// Unsigned EXIF rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rational {
    pub num: u32,
    pub denom: u32,
}

impl Rational {
    pub fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Rationals(Vec<Rational>),
    Text(String),
    /// Any other value type, as rendered by the EXIF reader
    Other(String),
}

impl TagValue {
    pub fn from_field(field: &Field) -> Self {
        match field.value {
            Value::Rational(ref parts) => {
                TagValue::Rationals(parts.iter().map(|r| Rational::new(r.num, r.denom)).collect())
            }
            Value::Ascii(ref chunks) => {
                let text = chunks
                    .first()
                    .map(|bytes| String::from_utf8_lossy(bytes).trim_end_matches('\0').trim().to_string())
                    .unwrap_or_default();
                TagValue::Text(text)
            }
            _ => TagValue::Other(field.display_value().to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            TagValue::Rationals(parts) => parts.is_empty(),
            TagValue::Text(text) | TagValue::Other(text) => text.is_empty(),
        }
    }
}

/// The GPS subset of an image's EXIF directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionTagBlock {
    entries: BTreeMap<TagKey, TagValue>,
}

impl PositionTagBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TagKey, value: TagValue) {
        self.entries.insert(key, value);
    }

    pub fn with(mut self, name: &'static str, value: TagValue) -> Self {
        self.insert(TagKey::Named(name), value);
        self
    }

    pub fn remove(&mut self, name: &'static str) -> Option<TagValue> {
        self.entries.remove(&TagKey::Named(name))
    }

    pub fn get(&self, name: &'static str) -> Option<&TagValue> {
        self.entries.get(&TagKey::Named(name))
    }

    pub fn get_raw(&self, number: u16) -> Option<&TagValue> {
        self.entries.get(&TagKey::Raw(number))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &TagValue)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
