//! Spatial indexing, distances and proximity grouping.

pub mod grouping;
pub mod index;
pub mod queries;

pub use grouping::{group, group_by, group_with_candidates, ProximityGroup};
pub use index::PointIndex;
pub use queries::{haversine_distance, polyline_min_distance, EARTH_RADIUS_M};
