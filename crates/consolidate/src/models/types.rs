//! Core data types and enums for consolidation.

use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Geographic Point
// ============================================================================

/// A WGS-84 position in degrees.
///
/// Latitude is kept in [-90, 90] and longitude in [-180, 180]; the only ways to
/// build one from untrusted input ([`GeoPoint::new`], [`GeoPoint::from_position`])
/// check both ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ConsolidateError::InvalidCoordinate(format!(
                "latitude {} outside [-90, 90]",
                lat
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(ConsolidateError::InvalidCoordinate(format!(
                "longitude {} outside [-180, 180]",
                lon
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Build from a GeoJSON position (`[longitude, latitude, ...]`).
    pub fn from_position(position: &[f64]) -> Result<Self> {
        match position {
            [lon, lat, ..] => Self::new(*lat, *lon),
            _ => Err(ConsolidateError::InvalidCoordinate(format!(
                "position has {} components, expected at least 2",
                position.len()
            ))),
        }
    }

    /// Mean of two in-range points is in range, so callers averaging
    /// validated points may skip the checks.
    pub(crate) fn from_mean(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// GeoJSON position, longitude first.
    pub fn to_position(&self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl From<GeoPoint> for geo::Point {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lon, p.lat)
    }
}

impl From<GeoPoint> for geo::Coord {
    fn from(p: GeoPoint) -> Self {
        geo::Coord { x: p.lon, y: p.lat }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Transit mode a line belongs to.
///
/// Unrecognised tags are kept verbatim in [`Category::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "String", from = "String"))]
pub enum Category {
    Metro,
    Tram,
    Suburban,
    Bus,
    Trolley,
    Other(String),
}

impl Category {
    /// Parse a category tag or a data directory name.
    ///
    /// Accepts the singular tag (`"tram"`), the plural used by the bus and
    /// trolley folders (`"buses"`, `"trolleys"`), and the descriptive folder
    /// names (`"Metro lines"`, `"Suburban Railway lines"`).
    pub fn parse(tag: &str) -> Self {
        let normalized = tag.trim().to_lowercase();
        let head = normalized
            .strip_suffix(" lines")
            .unwrap_or(&normalized)
            .trim();

        match head {
            "metro" | "subway" => Self::Metro,
            "tram" | "trams" => Self::Tram,
            "suburban" | "suburban railway" | "rail" => Self::Suburban,
            "bus" | "buses" => Self::Bus,
            "trolley" | "trolleys" => Self::Trolley,
            _ => Self::Other(tag.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Metro => "metro",
            Self::Tram => "tram",
            Self::Suburban => "suburban",
            Self::Bus => "bus",
            Self::Trolley => "trolley",
            Self::Other(tag) => tag,
        }
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        Self::parse(&tag)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConsolidateError {
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Malformed feature #{index}: {reason}")]
    MalformedFeature { index: usize, reason: String },

    #[error("Expected a FeatureCollection, found {0}")]
    NotAFeatureCollection(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConsolidateError>;
