//! Input features consumed by the consolidators.
//!
//! Both kinds are built once by the decoder and only ever read afterwards;
//! consolidation produces new records instead of editing these.

use crate::identifiers::*;
use crate::models::traits::Located;
use crate::models::types::*;

/// Free-form GeoJSON property map.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// A stop or station served by one line.
#[derive(Clone, Debug, PartialEq)]
pub struct PointFeature {
    pub location: GeoPoint,
    pub name: String,
    pub name_en: String,
    pub stop_code: Option<StopCode>,
    pub line: LineIdentifier,
    pub category: Category,
}

impl PointFeature {
    pub fn new(
        location: GeoPoint,
        name: impl Into<String>,
        line: impl Into<LineIdentifier>,
        category: Category,
    ) -> Self {
        Self {
            location,
            name: name.into(),
            name_en: String::new(),
            stop_code: None,
            line: line.into(),
            category,
        }
    }

    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        self.name_en = name_en.into();
        self
    }

    /// Empty codes are treated as absent.
    pub fn with_stop_code(mut self, code: impl Into<StopCode>) -> Self {
        let code = code.into();
        self.stop_code = if code.is_empty() { None } else { Some(code) };
        self
    }
}

impl Located for PointFeature {
    fn location(&self) -> GeoPoint {
        self.location
    }
}

/// A route path: an ordered run of at least one vertex.
#[derive(Clone, Debug, PartialEq)]
pub struct LineFeature {
    pub path: Vec<GeoPoint>,
    pub properties: Properties,
}

impl LineFeature {
    pub fn new(path: Vec<GeoPoint>, properties: Properties) -> Self {
        Self { path, properties }
    }
}
