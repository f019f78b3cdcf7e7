//! Route segment merging.
//!
//! Segments of one line that run close to each other (duplicate traces,
//! per-direction pieces) are joined into a single polyline. Joining is plain
//! concatenation in input order; there is no path reconstruction.

use crate::config::SegmentConfig;
use crate::models::{GeoPoint, LineFeature, Properties};
use crate::spatial::{group_by, haversine_distance, polyline_min_distance};

/// Values of the `type` property that mark a route path.
const ROUTE_PATH_TYPES: &[&str] = &["route_path", "Line"];

/// Whether a raw feature takes part in segment merging.
///
/// A feature is a route path when its `type` property says so, or when it has
/// no `type` and its geometry is a line.
pub fn is_route_path(feature: &geojson::Feature) -> bool {
    let feature_type = feature
        .properties
        .as_ref()
        .and_then(|p| p.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or("");

    if !feature_type.is_empty() {
        return ROUTE_PATH_TYPES.contains(&feature_type);
    }

    matches!(
        feature.geometry.as_ref().map(|g| &g.value),
        Some(geojson::Value::LineString(_)) | Some(geojson::Value::MultiLineString(_))
    )
}

/// Several segments joined into one.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedLine {
    /// Input indices of the joined segments, ascending.
    pub members: Vec<usize>,
    pub path: Vec<GeoPoint>,
    /// Copied from the first member.
    pub properties: Properties,
}

/// What became of one proximity group.
#[derive(Clone, Debug, PartialEq)]
pub enum MergeOutcome {
    /// A segment with no close neighbour, passed through unchanged.
    Kept(usize),
    Merged(MergedLine),
}

impl MergeOutcome {
    pub fn members(&self) -> Vec<usize> {
        match self {
            Self::Kept(index) => vec![*index],
            Self::Merged(line) => line.members.clone(),
        }
    }
}

/// Concatenate segments in order.
///
/// When a segment starts within `junction_radius_m` of the running end, its
/// first vertex is taken to be the same junction and dropped. Otherwise the
/// whole segment is appended and the gap is left as is.
pub fn concatenate(segments: &[&[GeoPoint]], junction_radius_m: f64) -> Vec<GeoPoint> {
    let mut merged: Vec<GeoPoint> = Vec::with_capacity(segments.iter().map(|s| s.len()).sum());

    for segment in segments {
        match (merged.last(), segment.first()) {
            (Some(&end), Some(&start)) if haversine_distance(end, start) <= junction_radius_m => {
                merged.extend_from_slice(&segment[1..]);
            }
            _ => merged.extend_from_slice(segment),
        }
    }

    merged
}

/// Group close segments and join each group.
///
/// Outcomes come in group discovery order.
pub fn merge_lines(features: &[LineFeature], config: &SegmentConfig) -> Vec<MergeOutcome> {
    if features.is_empty() {
        log::warn!("No route segments to merge");
        return Vec::new();
    }

    log::debug!("Analyzing {} segments for proximity", features.len());

    let groups = group_by(features.len(), |i, j| {
        polyline_min_distance(
            &features[i].path,
            &features[j].path,
            config.sample_stride,
            config.near_zero_short_circuit_meters,
        ) <= config.combination_radius_meters
    });

    groups
        .into_iter()
        .map(|group| {
            if group.is_singleton() {
                return MergeOutcome::Kept(group.first());
            }

            log::debug!("Merging {} close segments into one", group.len());

            let segments: Vec<&[GeoPoint]> = group
                .members()
                .iter()
                .map(|&i| features[i].path.as_slice())
                .collect();

            MergeOutcome::Merged(MergedLine {
                members: group.members().to_vec(),
                path: concatenate(&segments, config.junction_dedup_radius_meters),
                properties: features[group.first()].properties.clone(),
            })
        })
        .collect()
}
