//! R-tree nodes for spatial indexing.
//!
//! ## Two-Stage Filtering
//!
//! Queries use a two-stage filtering approach:
//! 1. **R-tree filter**: a longitude/latitude box that is guaranteed to contain
//!    every point within the search radius
//! 2. **Haversine filter**: the caller applies the exact distance test to the
//!    candidates
//!
//! The box only ever admits extra candidates, so the second stage sees every
//! true neighbour and results are the same as comparing all pairs.

use std::f64::consts::FRAC_PI_2;

use rstar::{RTree, RTreeObject, AABB};

use crate::models::{GeoPoint, Located};
use crate::spatial::queries::EARTH_RADIUS_M;

/// Slack applied to box half-widths so rounding never excludes a boundary point.
const ENVELOPE_SLACK: f64 = 1.0 + 1e-6;

// ============================================================================
// Point Spatial Node
// ============================================================================

#[derive(Clone, Debug)]
pub struct PointNode {
    pub index: usize,
    point: [f64; 2],
}

impl PointNode {
    pub fn new(index: usize, location: GeoPoint) -> Self {
        Self {
            index,
            point: [location.lon(), location.lat()],
        }
    }
}

impl RTreeObject for PointNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ============================================================================
// Index
// ============================================================================

/// R-tree over the positions of a slice of located items, keyed by slice index.
pub struct PointIndex {
    tree: RTree<PointNode>,
}

impl PointIndex {
    pub fn new<T: Located>(items: &[T]) -> Self {
        let nodes = items
            .iter()
            .enumerate()
            .map(|(i, item)| PointNode::new(i, item.location()))
            .collect();

        Self {
            tree: RTree::bulk_load(nodes),
        }
    }

    /// Indices of every item that may lie within `radius_m` of `center`,
    /// in ascending order.
    pub fn candidates_within(&self, center: GeoPoint, radius_m: f64) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .tree
            .locate_in_envelope(&search_envelope(center, radius_m))
            .map(|node| node.index)
            .collect();
        found.sort_unstable();
        found
    }
}

/// Bounding box (in degrees) of the spherical cap of `radius_m` around `center`.
///
/// Latitude half-width is the angular radius. Longitude half-width is
/// `asin(sin(δ) / cos(φ))`, widening to the full circle once the cap reaches
/// a pole.
pub fn search_envelope(center: GeoPoint, radius_m: f64) -> AABB<[f64; 2]> {
    let angular = radius_m.max(0.0) / EARTH_RADIUS_M;
    let lat = center.lat().to_radians();

    let dlat = angular.to_degrees() * ENVELOPE_SLACK;
    let dlon = if angular >= FRAC_PI_2 || lat.abs() + angular >= FRAC_PI_2 {
        360.0
    } else {
        (angular.sin() / lat.cos()).asin().to_degrees() * ENVELOPE_SLACK
    };

    AABB::from_corners(
        [center.lon() - dlon, center.lat() - dlat],
        [center.lon() + dlon, center.lat() + dlat],
    )
}
