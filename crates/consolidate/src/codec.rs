//! GeoJSON decoding and encoding.
//!
//! Parsing is lenient per feature: one bad feature is recorded as a
//! [`SkippedFeature`] and the rest of the collection still comes through.

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use serde_json::json;

use crate::identifiers::*;
use crate::models::*;

/// Property keys tried in order for a stop's display name.
const NAME_KEYS: &[&str] = &["name_gr", "NAME", "STATHMOI", "name_en", "name"];

/// Property keys tried in order for a stop's English name.
const NAME_EN_KEYS: &[&str] = &["name_en", "name:en"];

/// `railway` values of level crossings mapped as points on a route.
const CROSSING_TAGS: &[&str] = &["railway_crossing", "crossing"];

/// A feature left out of processing, and why.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedFeature {
    pub index: usize,
    pub reason: String,
}

impl SkippedFeature {
    pub(crate) fn from_error(index: usize, error: ConsolidateError) -> Self {
        let reason = match error {
            ConsolidateError::MalformedFeature { reason, .. } => reason,
            other => other.to_string(),
        };
        log::warn!("Skipping feature #{}: {}", index, reason);
        Self { index, reason }
    }
}

/// A parsed FeatureCollection.
#[derive(Clone, Debug, Default)]
pub struct DecodedCollection {
    pub features: Vec<Feature>,
    pub skipped: Vec<SkippedFeature>,
    pub foreign_members: Option<JsonObject>,
}

impl DecodedCollection {
    pub fn into_collection(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: self.foreign_members,
        }
    }
}

fn malformed(index: usize, reason: impl Into<String>) -> ConsolidateError {
    ConsolidateError::MalformedFeature {
        index,
        reason: reason.into(),
    }
}

/// Parse a FeatureCollection document, decoding each feature on its own.
pub fn parse_collection(text: &str) -> Result<DecodedCollection> {
    let document: serde_json::Value = serde_json::from_str(text)?;

    let serde_json::Value::Object(mut object) = document else {
        return Err(ConsolidateError::NotAFeatureCollection(
            "a non-object document".to_string(),
        ));
    };

    match object.get("type").and_then(|t| t.as_str()) {
        Some("FeatureCollection") => {}
        Some(other) => return Err(ConsolidateError::NotAFeatureCollection(other.to_string())),
        None => {
            return Err(ConsolidateError::NotAFeatureCollection(
                "an object without `type`".to_string(),
            ))
        }
    }

    let raw_features = match object.remove("features") {
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => {
            return Err(ConsolidateError::NotAFeatureCollection(
                "a collection whose `features` is not an array".to_string(),
            ))
        }
        None => Vec::new(),
    };

    object.remove("type");
    object.remove("bbox");

    let mut decoded = DecodedCollection {
        features: Vec::with_capacity(raw_features.len()),
        skipped: Vec::new(),
        foreign_members: if object.is_empty() { None } else { Some(object) },
    };

    for (index, raw) in raw_features.into_iter().enumerate() {
        match Feature::from_json_value(raw) {
            Ok(feature) => decoded.features.push(feature),
            Err(e) => decoded
                .skipped
                .push(SkippedFeature::from_error(index, malformed(index, e.to_string()))),
        }
    }

    Ok(decoded)
}

/// Serialize a collection as indented JSON.
pub fn to_pretty_json(collection: FeatureCollection) -> Result<String> {
    let geojson = GeoJson::from(collection);
    Ok(serde_json::to_string_pretty(&geojson)?)
}

// ============================================================================
// Stops
// ============================================================================

/// Stops decoded from one line's collection.
#[derive(Clone, Debug, Default)]
pub struct StopBatch {
    pub stops: Vec<PointFeature>,
    pub skipped: Vec<SkippedFeature>,
    /// Points that are not stations (level crossings).
    pub filtered: usize,
}

fn first_string(properties: &JsonObject, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| properties.get(*key))
        .find_map(|value| match value {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn is_crossing(properties: &JsonObject) -> bool {
    properties
        .get("railway")
        .and_then(|r| r.as_str())
        .is_some_and(|r| CROSSING_TAGS.contains(&r))
}

fn geometry_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Decode one feature as a stop of `line`.
///
/// `Ok(None)` means the feature is not a stop: a line geometry sharing the
/// file, or a level crossing. Any other non-Point geometry is malformed.
pub fn decode_stop(
    feature: &Feature,
    index: usize,
    line: &LineIdentifier,
    category: &Category,
) -> Result<Option<PointFeature>> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| malformed(index, "feature has no geometry"))?;

    let position = match &geometry.value {
        Value::Point(position) => position,
        Value::LineString(_) | Value::MultiLineString(_) => return Ok(None),
        other => {
            return Err(malformed(
                index,
                format!("unsupported stop geometry {}", geometry_name(other)),
            ))
        }
    };

    let location =
        GeoPoint::from_position(position).map_err(|e| malformed(index, e.to_string()))?;

    let empty = JsonObject::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);

    if is_crossing(properties) {
        log::debug!("Feature #{} is a level crossing, not a stop", index);
        return Ok(None);
    }

    let mut stop = PointFeature::new(
        location,
        first_string(properties, NAME_KEYS).unwrap_or_default(),
        line.clone(),
        category.clone(),
    )
    .with_name_en(first_string(properties, NAME_EN_KEYS).unwrap_or_default());

    if let Some(code) = first_string(properties, &["stop_code"]) {
        stop = stop.with_stop_code(code);
    }

    Ok(Some(stop))
}

/// Decode every stop in `features`, tagging each with `line` and `category`.
pub fn decode_stops(features: &[Feature], line: &LineIdentifier, category: &Category) -> StopBatch {
    let mut batch = StopBatch::default();

    for (index, feature) in features.iter().enumerate() {
        match decode_stop(feature, index, line, category) {
            Ok(Some(stop)) => batch.stops.push(stop),
            Ok(None) => {
                if feature.properties.as_ref().is_some_and(is_crossing) {
                    batch.filtered += 1;
                }
            }
            Err(e) => batch.skipped.push(SkippedFeature::from_error(index, e)),
        }
    }

    batch
}

// ============================================================================
// Route paths
// ============================================================================

/// Decode a LineString feature.
///
/// `Ok(None)` means the geometry is not a LineString; such features are not
/// merged but are kept as they are.
pub fn decode_line(feature: &Feature, index: usize) -> Result<Option<LineFeature>> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| malformed(index, "feature has no geometry"))?;

    let positions = match &geometry.value {
        Value::LineString(positions) => positions,
        _ => return Ok(None),
    };

    if positions.is_empty() {
        return Err(malformed(index, "LineString has no coordinates"));
    }

    let path = positions
        .iter()
        .map(|p| GeoPoint::from_position(p))
        .collect::<Result<Vec<_>>>()
        .map_err(|e| malformed(index, e.to_string()))?;

    Ok(Some(LineFeature::new(
        path,
        feature.properties.clone().unwrap_or_default(),
    )))
}

/// Encode a path as a LineString feature.
pub fn encode_line(path: &[GeoPoint], properties: Properties) -> Feature {
    let coordinates: Vec<Vec<f64>> = path.iter().map(|p| p.to_position()).collect();

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coordinates))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

// ============================================================================
// Combined stations
// ============================================================================

/// Encode a combined station as a Point feature.
pub fn encode_station(station: &CombinedStation) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(station.name));
    properties.insert("name_en".to_string(), json!(station.name_en));
    properties.insert(
        "stop_codes".to_string(),
        json!(station.stop_codes.iter().map(|c| c.as_str()).collect::<Vec<_>>()),
    );
    properties.insert(
        "lines".to_string(),
        json!(station.lines.iter().map(|l| l.as_str()).collect::<Vec<_>>()),
    );
    properties.insert(
        "categories".to_string(),
        json!(station.categories.iter().map(|c| c.as_str()).collect::<Vec<_>>()),
    );
    properties.insert("member_count".to_string(), json!(station.member_count));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(station.location.to_position()))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Encode combined stations as a FeatureCollection, keeping their order.
pub fn encode_stations(stations: &[CombinedStation]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: stations.iter().map(encode_station).collect(),
        foreign_members: None,
    }
}

fn string_list(properties: &JsonObject, key: &str) -> Vec<String> {
    properties
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Decode a feature written by [`encode_station`].
///
/// Files without `member_count` count one member per line.
pub fn decode_station(feature: &Feature, index: usize) -> Result<CombinedStation> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| malformed(index, "feature has no geometry"))?;

    let Value::Point(position) = &geometry.value else {
        return Err(malformed(index, "combined station is not a Point"));
    };
    let location =
        GeoPoint::from_position(position).map_err(|e| malformed(index, e.to_string()))?;

    let empty = JsonObject::new();
    let properties = feature.properties.as_ref().unwrap_or(&empty);
    let lines = string_list(properties, "lines");

    Ok(CombinedStation {
        name: first_string(properties, &["name"]).unwrap_or_default(),
        name_en: first_string(properties, &["name_en"]).unwrap_or_default(),
        location,
        stop_codes: string_list(properties, "stop_codes")
            .into_iter()
            .map(StopCode::from)
            .collect(),
        member_count: properties
            .get("member_count")
            .and_then(|c| c.as_u64())
            .map_or(lines.len(), |c| c as usize),
        lines: lines.into_iter().map(LineIdentifier::from).collect(),
        categories: string_list(properties, "categories")
            .iter()
            .map(|c| Category::parse(c))
            .collect(),
    })
}
