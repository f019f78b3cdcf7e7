//! Spatial query utilities for distance calculations.
//!
//! Uses the Haversine formula on a sphere of fixed radius.

use crate::models::GeoPoint;

/// Earth radius used by every distance in this crate.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let delta_phi = (b.lat() - a.lat()).to_radians();
    let delta_lambda = (b.lon() - a.lon()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());

    EARTH_RADIUS_M * c
}

/// Vertex indices compared by [`polyline_min_distance`]: every `stride`-th
/// vertex, plus the last one.
pub fn sample_indices(len: usize, stride: usize) -> impl Iterator<Item = usize> {
    let stride = stride.max(1);
    let last = len.checked_sub(1);
    (0..len)
        .step_by(stride)
        .chain(last.filter(|l| l % stride != 0))
}

/// Approximate minimum distance between two polylines in meters.
///
/// Only sampled vertices are compared (see [`sample_indices`]), so a close
/// approach between two unsampled vertices can be missed. Returns as soon as
/// a pair closer than `short_circuit_m` is found, and `f64::INFINITY` when
/// either side is empty.
pub fn polyline_min_distance(
    p: &[GeoPoint],
    q: &[GeoPoint],
    stride: usize,
    short_circuit_m: f64,
) -> f64 {
    let mut min = f64::INFINITY;

    for i in sample_indices(p.len(), stride) {
        for j in sample_indices(q.len(), stride) {
            let d = haversine_distance(p[i], q[j]);
            if d < min {
                min = d;
            }
            if min < short_circuit_m {
                return min;
            }
        }
    }

    min
}

/// Convert meters to degrees of latitude (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    (meters / EARTH_RADIUS_M).to_degrees()
}
