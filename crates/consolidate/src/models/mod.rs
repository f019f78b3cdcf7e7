//! Consolidation data models, types, and traits.

pub mod feature;
pub mod station;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use feature::{LineFeature, PointFeature, Properties};
pub use station::CombinedStation;
pub use traits::Located;
pub use types::{Category, ConsolidateError, GeoPoint, Result};
