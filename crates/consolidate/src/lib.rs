//! # transit-consolidate
//!
//! Consolidation of raw transit GeoJSON into clean map features.
//!
//! ## Features
//!
//! - **Station consolidation**: stops of different lines at the same place become one station
//! - **Segment merging**: close route segments of a line are joined into one polyline
//! - **Spatial queries**: haversine distances with an R-tree prefilter
//! - **Lenient decoding**: malformed features are skipped and reported, not fatal
//!
//! ## Example
//!
//! ```
//! use transit_consolidate::prelude::*;
//!
//! let stops = vec![
//!     PointFeature::new(GeoPoint::new(37.9755, 23.7348)?, "Syntagma", "2", Category::Metro),
//!     PointFeature::new(GeoPoint::new(37.9756, 23.7349)?, "Syntagma", "3", Category::Metro),
//!     PointFeature::new(GeoPoint::new(37.9760, 23.7259)?, "Monastiraki", "1", Category::Metro),
//! ];
//!
//! let stations = consolidate_points(&stops, &StationConfig::default());
//! assert_eq!(stations.len(), 2);
//! assert_eq!(stations[0].lines_display(), "M2, M3");
//! # Ok::<(), ConsolidateError>(())
//! ```

pub mod codec;
pub mod config;
pub mod directory;
pub mod identifiers;
pub mod merge;
pub mod models;
pub mod palette;
pub mod pipeline;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::codec::{encode_stations, parse_collection, to_pretty_json, SkippedFeature};
    pub use crate::config::{ConsolidationConfig, SegmentConfig, StationConfig};
    pub use crate::directory::{StationDirectory, DEFAULT_LOOKUP_RADIUS_M};
    pub use crate::identifiers::*;
    pub use crate::merge::{consolidate_points, merge_lines, MergeOutcome, MergedLine};
    pub use crate::models::{feature::*, station::*, traits::*, types::*};
    pub use crate::pipeline::{Consolidator, LineSource, SegmentReport, StationReport};
    pub use crate::spatial::{haversine_distance, polyline_min_distance};
}

pub use prelude::*;
