//! # Geodesy functions
//!
//! Great circle calculations on a spherical Earth, plus parsing of degrees-minutes-seconds
//! coordinate strings. All angles are in decimal degrees, bearings are measured clockwise from
//! true north.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::maths::norm_angle_deg;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Mean radius of the Earth.
///
/// Units: meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Delimiter following the degrees component of a DMS string.
const DEG_DELIM: char = '°';

/// Delimiter following the minutes component of a DMS string.
const MIN_DELIM: char = '\'';

/// Delimiter following the seconds component of a DMS string.
const SEC_DELIM: char = '"';

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point on the Earth's surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, positive north.
    ///
    /// Units: degrees
    pub lat_deg: f64,

    /// Longitude, positive east.
    ///
    /// Units: degrees
    pub lng_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GeoPoint {
    pub fn new(lat_deg: f64, lng_deg: f64) -> Self {
        Self { lat_deg, lng_deg }
    }

    /// Great circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_m(self.lat_deg, self.lng_deg, other.lat_deg, other.lng_deg)
    }

    /// Initial bearing towards `other` in degrees, in `[0, 360)`.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing_deg(self.lat_deg, self.lng_deg, other.lat_deg, other.lng_deg)
    }

    /// Parse a `lat,lng` pair of DMS strings, such as `48°50'18"N,2°18'41"E`.
    ///
    /// Whitespace around either coordinate is ignored. Returns `None` if there is no comma or if
    /// either coordinate is malformed.
    pub fn from_dms_pair(text: &str) -> Option<Self> {
        let mut parts = text.splitn(2, ',');

        let lat = try_parse_dms(parts.next()?)?;
        let lng = try_parse_dms(parts.next()?)?;

        Some(Self::new(lat, lng))
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Great circle distance between two points using the haversine formula.
///
/// Units: meters, always `>= 0`.
pub fn distance_m(lat1_deg: f64, lng1_deg: f64, lat2_deg: f64, lng2_deg: f64) -> f64 {
    let d_lat = (lat2_deg - lat1_deg).to_radians();
    let d_lng = (lng2_deg - lng1_deg).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_deg.to_radians().cos()
        * lat2_deg.to_radians().cos()
        * (d_lng / 2.0).sin().powi(2);

    // Round-off can push a fractionally outside [0, 1]
    let a = crate::maths::clamp(a, 0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from point 1 to point 2.
///
/// Units: degrees in `[0, 360)`, 0 being north. Coincident points give a bearing of 0.
pub fn bearing_deg(lat1_deg: f64, lng1_deg: f64, lat2_deg: f64, lng2_deg: f64) -> f64 {
    let d_lng = (lng2_deg - lng1_deg).to_radians();
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    norm_angle_deg(y.atan2(x).to_degrees())
}

/// Parse a `D°M'S"H` string into signed decimal degrees.
///
/// `H` is one of `N`, `S`, `E` or `W` (either case), southern and western coordinates are
/// negative. The hemisphere letter may be omitted, in which case the value is positive.
///
/// Returns `NaN` if the string is malformed, use [`try_parse_dms`] for an `Option`.
pub fn parse_dms(text: &str) -> f64 {
    try_parse_dms(text).unwrap_or(std::f64::NAN)
}

/// Parse a `D°M'S"H` string into signed decimal degrees, or `None` if the string is malformed.
pub fn try_parse_dms(text: &str) -> Option<f64> {
    let text = text.trim();

    let deg_pos = text.find(DEG_DELIM)?;
    let min_pos = text.find(MIN_DELIM)?;
    let sec_pos = text.find(SEC_DELIM)?;

    if !(deg_pos < min_pos && min_pos < sec_pos) {
        return None
    }

    let degrees: f64 = text[..deg_pos].trim().parse().ok()?;
    let minutes: f64 = text[deg_pos + DEG_DELIM.len_utf8()..min_pos].trim().parse().ok()?;
    let seconds: f64 = text[min_pos + MIN_DELIM.len_utf8()..sec_pos].trim().parse().ok()?;

    let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;

    if !magnitude.is_finite() {
        return None
    }

    match text[sec_pos + SEC_DELIM.len_utf8()..].trim() {
        "" | "N" | "n" | "E" | "e" => Some(magnitude),
        "S" | "s" | "W" | "w" => Some(-magnitude),
        _ => None
    }
}
