//! Flexible polyline codec for route geometries.
//!
//! The provider ships section geometry as a compact text string: a header
//! (format version, then a word carrying precision and the optional third
//! dimension) followed by zig-zag encoded deltas packed into 6-bit chunks.
//! Each chunk carries 5 payload bits plus a continuation flag.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENCODING_TABLE: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

const FORMAT_VERSION: u64 = 1;

/// Largest decimal precision the 4-bit header field can carry.
pub const MAX_PRECISION: u32 = 15;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when the point lies on Earth's coordinate ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// The same point with latitude and longitude exchanged.
    pub fn swapped(&self) -> Self {
        Self::new(self.lng, self.lat)
    }
}

/// Kind of the optional third value stored with every point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThirdDimension {
    #[default]
    Absent,
    Level,
    Altitude,
    Elevation,
    Reserved1,
    Reserved2,
    Custom1,
    Custom2,
}

impl ThirdDimension {
    fn from_bits(bits: u64) -> Self {
        match bits & 0x7 {
            1 => Self::Level,
            2 => Self::Altitude,
            3 => Self::Elevation,
            4 => Self::Reserved1,
            5 => Self::Reserved2,
            6 => Self::Custom1,
            7 => Self::Custom2,
            _ => Self::Absent,
        }
    }

    fn bits(self) -> u64 {
        match self {
            Self::Absent => 0,
            Self::Level => 1,
            Self::Altitude => 2,
            Self::Elevation => 3,
            Self::Reserved1 => 4,
            Self::Reserved2 => 5,
            Self::Custom1 => 6,
            Self::Custom2 => 7,
        }
    }

    pub fn is_present(self) -> bool {
        self != Self::Absent
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("invalid polyline character {character:?} at byte {position}")]
    InvalidCharacter { character: char, position: usize },
    #[error("polyline ended in the middle of a value")]
    Truncated,
    #[error("unsupported polyline format version {0}")]
    UnsupportedVersion(u64),
    #[error("polyline precision {0} is out of range (max {MAX_PRECISION})")]
    PrecisionOutOfRange(u32),
    #[error("polyline value overflowed while decoding")]
    Overflow,
}

/// A decoded route geometry.
///
/// Keeps the header values alongside the points so a caller can re-encode
/// with the precision the provider used.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point>,
    precision: u32,
    third_dimension: ThirdDimension,
}

impl Polyline {
    /// Creates a new Polyline from decoded coordinate points.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            precision: 5,
            third_dimension: ThirdDimension::Absent,
        }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Decimal precision declared in the header.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Third dimension declared in the header. Its values are not kept.
    pub fn third_dimension(&self) -> ThirdDimension {
        self.third_dimension
    }

    pub fn bounds(&self) -> Option<PolylineBounds> {
        PolylineBounds::from_points(&self.points)
    }

    /// Re-encodes the points at the given precision.
    pub fn encode(&self, precision: u32) -> Result<String, PolylineError> {
        encode(&self.points, precision)
    }
}

/// Extent and endpoints of a point sequence, used for sanity checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    pub first: Point,
    pub last: Point,
}

impl PolylineBounds {
    /// Returns `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let last = *points.last()?;
        let mut bounds = Self {
            min_lat: first.lat,
            max_lat: first.lat,
            min_lng: first.lng,
            max_lng: first.lng,
            first,
            last,
        };
        for point in &points[1..] {
            bounds.min_lat = bounds.min_lat.min(point.lat);
            bounds.max_lat = bounds.max_lat.max(point.lat);
            bounds.min_lng = bounds.min_lng.min(point.lng);
            bounds.max_lng = bounds.max_lng.max(point.lng);
        }
        Some(bounds)
    }

    /// True when the whole extent fits Earth's coordinate ranges.
    pub fn is_plausible(&self) -> bool {
        within(self.min_lat, self.max_lat, -90.0, 90.0)
            && within(self.min_lng, self.max_lng, -180.0, 180.0)
    }

    /// True when the extent fits a European route (lat 30..70, lng -20..40).
    pub fn is_plausible_for_europe(&self) -> bool {
        within(self.min_lat, self.max_lat, 30.0, 70.0)
            && within(self.min_lng, self.max_lng, -20.0, 40.0)
    }
}

fn within(min: f64, max: f64, lower: f64, upper: f64) -> bool {
    min.is_finite() && max.is_finite() && min >= lower && max <= upper
}

/// Decodes a flexible polyline string.
///
/// An empty (or whitespace-only) string yields an empty polyline. Third
/// dimension values are consumed and discarded.
pub fn decode(encoded: &str) -> Result<Polyline, PolylineError> {
    let encoded = encoded.trim();
    if encoded.is_empty() {
        return Ok(Polyline::default());
    }

    let mut reader = ChunkReader::new(encoded);
    let header = Header::read(&mut reader)?;
    let factor = 10f64.powi(header.precision as i32);

    let mut points = Vec::new();
    let (mut lat, mut lng) = (0i64, 0i64);
    while let Some(delta_lat) = reader.next_signed()? {
        let delta_lng = reader.next_signed()?.ok_or(PolylineError::Truncated)?;
        if header.third_dimension.is_present() {
            reader.next_signed()?.ok_or(PolylineError::Truncated)?;
        }
        lat = lat.checked_add(delta_lat).ok_or(PolylineError::Overflow)?;
        lng = lng.checked_add(delta_lng).ok_or(PolylineError::Overflow)?;
        points.push(Point::new(lat as f64 / factor, lng as f64 / factor));
    }

    Ok(Polyline {
        points,
        precision: header.precision,
        third_dimension: header.third_dimension,
    })
}

/// Encodes 2-D points. An empty slice encodes to an empty string.
pub fn encode(points: &[Point], precision: u32) -> Result<String, PolylineError> {
    let header = Header {
        precision,
        third_dimension: ThirdDimension::Absent,
        third_precision: 0,
    };
    encode_points(points.iter().map(|point| (*point, 0.0)), points.len(), header)
}

/// Encodes points carrying a third value (altitude, level, ...).
pub fn encode_3d(
    points: &[(Point, f64)],
    precision: u32,
    third_dimension: ThirdDimension,
    third_precision: u32,
) -> Result<String, PolylineError> {
    let header = Header {
        precision,
        third_dimension,
        third_precision,
    };
    encode_points(points.iter().copied(), points.len(), header)
}

fn encode_points(
    points: impl Iterator<Item = (Point, f64)>,
    count: usize,
    header: Header,
) -> Result<String, PolylineError> {
    header.validate()?;
    if count == 0 {
        return Ok(String::new());
    }

    let factor = 10f64.powi(header.precision as i32);
    let third_factor = 10f64.powi(header.third_precision as i32);

    let mut out = String::with_capacity(count * 8 + 4);
    push_unsigned(&mut out, FORMAT_VERSION);
    push_unsigned(&mut out, header.word());

    let (mut last_lat, mut last_lng, mut last_third) = (0i64, 0i64, 0i64);
    for (point, third) in points {
        let lat = scale(point.lat, factor);
        let lng = scale(point.lng, factor);
        push_signed(&mut out, lat - last_lat);
        push_signed(&mut out, lng - last_lng);
        last_lat = lat;
        last_lng = lng;

        if header.third_dimension.is_present() {
            let value = scale(third, third_factor);
            push_signed(&mut out, value - last_third);
            last_third = value;
        }
    }
    Ok(out)
}

fn scale(value: f64, factor: f64) -> i64 {
    (value * factor).round() as i64
}

fn push_unsigned(out: &mut String, mut value: u64) {
    while value > 0x1F {
        out.push(ENCODING_TABLE[((value & 0x1F) | 0x20) as usize] as char);
        value >>= 5;
    }
    out.push(ENCODING_TABLE[value as usize] as char);
}

fn push_signed(out: &mut String, value: i64) {
    let mut encoded = (value as u64) << 1;
    if value < 0 {
        encoded = !encoded;
    }
    push_unsigned(out, encoded);
}

#[derive(Debug, Clone, Copy)]
struct Header {
    precision: u32,
    third_dimension: ThirdDimension,
    third_precision: u32,
}

impl Header {
    fn read(reader: &mut ChunkReader<'_>) -> Result<Self, PolylineError> {
        let version = reader.next_unsigned()?.ok_or(PolylineError::Truncated)?;
        if version != FORMAT_VERSION {
            return Err(PolylineError::UnsupportedVersion(version));
        }
        let word = reader.next_unsigned()?.ok_or(PolylineError::Truncated)?;
        Ok(Self {
            precision: (word & 0xF) as u32,
            third_dimension: ThirdDimension::from_bits(word >> 4),
            third_precision: ((word >> 7) & 0xF) as u32,
        })
    }

    fn validate(&self) -> Result<(), PolylineError> {
        if self.precision > MAX_PRECISION {
            return Err(PolylineError::PrecisionOutOfRange(self.precision));
        }
        if self.third_precision > MAX_PRECISION {
            return Err(PolylineError::PrecisionOutOfRange(self.third_precision));
        }
        Ok(())
    }

    fn word(&self) -> u64 {
        ((self.third_precision as u64) << 7)
            | (self.third_dimension.bits() << 4)
            | self.precision as u64
    }
}

struct ChunkReader<'a> {
    chars: std::str::CharIndices<'a>,
}

impl<'a> ChunkReader<'a> {
    fn new(encoded: &'a str) -> Self {
        Self {
            chars: encoded.char_indices(),
        }
    }

    /// Reads one varint. `None` means the input ended cleanly.
    fn next_unsigned(&mut self) -> Result<Option<u64>, PolylineError> {
        let mut result = 0u64;
        let mut shift = 0u32;
        for (position, character) in self.chars.by_ref() {
            let chunk = decode_char(character, position)?;
            let bits = chunk & 0x1F;
            if shift >= 64 || (shift > 59 && bits >> (64 - shift) != 0) {
                return Err(PolylineError::Overflow);
            }
            result |= bits << shift;
            if chunk & 0x20 == 0 {
                return Ok(Some(result));
            }
            shift += 5;
        }
        if shift == 0 {
            Ok(None)
        } else {
            Err(PolylineError::Truncated)
        }
    }

    fn next_signed(&mut self) -> Result<Option<i64>, PolylineError> {
        Ok(self.next_unsigned()?.map(zigzag_decode))
    }
}

fn zigzag_decode(value: u64) -> i64 {
    let mut signed = value as i64;
    if signed & 1 == 1 {
        signed = !signed;
    }
    signed >> 1
}

fn decode_char(character: char, position: usize) -> Result<u64, PolylineError> {
    let value = match character {
        'A'..='Z' => character as u64 - 'A' as u64,
        'a'..='z' => character as u64 - 'a' as u64 + 26,
        '0'..='9' => character as u64 - '0' as u64 + 52,
        '-' => 62,
        '_' => 63,
        _ => {
            return Err(PolylineError::InvalidCharacter {
                character,
                position,
            });
        }
    };
    Ok(value)
}
