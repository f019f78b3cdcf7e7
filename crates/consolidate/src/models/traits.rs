//! Traits shared by spatial code.

use crate::models::types::GeoPoint;

/// Anything with a single representative position.
///
/// Implemented by input stops and by combined stations so both can be put in
/// the same spatial index.
pub trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}
